use super::{PainRange, SolutionTier, Symptom};

fn tier(min: i64, max: i64, recommendations: &[&str], alert: bool) -> SolutionTier {
    SolutionTier {
        pain_level: PainRange(min, max),
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
        alert,
    }
}

fn symptom(id: i64, name: &str, category: &str, solutions: [SolutionTier; 3]) -> Symptom {
    Symptom {
        id,
        name: name.to_string(),
        categories: vec![category.to_string()],
        solutions: solutions.into(),
    }
}

pub(super) fn builtin_symptoms() -> Vec<Symptom> {
    vec![
        symptom(1, "Dolor de cabeza", "Neurológico", [
            tier(1, 3, &["Descansar", "Tomar agua"], false),
            tier(4, 7, &["Paracetamol", "Evitar luces brillantes"], false),
            tier(8, 10, &["Urgencias médicas inmediatas"], true),
        ]),
        symptom(2, "Fiebre", "General", [
            tier(1, 3, &["Líquidos abundantes", "Reposo"], false),
            tier(4, 7, &["Baño tibio", "Antipirético"], true),
            tier(8, 10, &["Urgencias médicas"], true),
        ]),
        symptom(3, "Dolor abdominal", "Digestivo", [
            tier(1, 3, &["Descansar", "Evitar comidas pesadas"], false),
            tier(4, 7, &["Consultar médico si persiste"], true),
            tier(8, 10, &["Urgencias, posible apendicitis"], true),
        ]),
        symptom(4, "Tos", "Respiratorio", [
            tier(1, 3, &["Miel con limón", "Líquidos tibios"], false),
            tier(4, 7, &["Jarabe para la tos"], false),
            tier(8, 10, &["Consulta médica inmediata"], true),
        ]),
        symptom(5, "Dolor de espalda", "Músculo-esquelético", [
            tier(1, 3, &["Estiramientos suaves", "Reposo"], false),
            tier(4, 7, &["Antiinflamatorio suave"], false),
            tier(8, 10, &["Consulta médica"], true),
        ]),
        symptom(6, "Mareos", "Neurológico", [
            tier(1, 3, &["Sentarse", "Tomar agua"], false),
            tier(4, 7, &["Consultar médico si repite"], true),
            tier(8, 10, &["Urgencias (posible vértigo)"], true),
        ]),
        symptom(7, "Dificultad para respirar", "Respiratorio", [
            tier(1, 3, &["Evitar esfuerzo físico"], true),
            tier(4, 7, &["Uso de inhalador (si aplica)"], true),
            tier(8, 10, &["Urgencias inmediatas"], true),
        ]),
        symptom(8, "Dolor de garganta", "Respiratorio", [
            tier(1, 3, &["Gárgaras con agua tibia", "Miel"], false),
            tier(4, 7, &["Pastillas para la garganta"], false),
            tier(8, 10, &["Consulta médica (posible infección)"], true),
        ]),
        symptom(9, "Náuseas", "Digestivo", [
            tier(1, 3, &["Beber agua en sorbos", "Reposo"], false),
            tier(4, 7, &["Infusión de jengibre"], false),
            tier(8, 10, &["Urgencias (posible intoxicación)"], true),
        ]),
        symptom(10, "Insomnio", "Neurológico", [
            tier(1, 3, &["Rutina de sueño regular"], false),
            tier(4, 7, &["Té relajante", "Evitar pantallas"], false),
            tier(8, 10, &["Consulta médica (posible ansiedad)"], true),
        ]),
    ]
}
