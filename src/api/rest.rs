use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

use crate::api::docs;
use crate::api::rejection::{handle_rejection, reject, reject_with};
use crate::catalog::SymptomCatalog;
use crate::error::RomiError;
use crate::patients::{IntakeRequest, PatientRegistry};
use crate::seed::CatalogSeeder;
use crate::storage::DocumentStore;

/// Largest intake body accepted, in bytes.
const MAX_BODY_BYTES: u64 = 16 * 1024;

pub struct RestApi {
    catalog: Arc<SymptomCatalog>,
    patients: Arc<PatientRegistry>,
    seeder: Arc<CatalogSeeder>,
    public_dir: PathBuf,
}

impl RestApi {
    pub fn new(catalog: Arc<SymptomCatalog>, store: Arc<dyn DocumentStore>, public_dir: PathBuf) -> Self {
        let patients = PatientRegistry::new(Arc::clone(&catalog), Arc::clone(&store));
        let seeder = CatalogSeeder::new(Arc::clone(&catalog), store);
        RestApi {
            catalog,
            patients: Arc::new(patients),
            seeder: Arc::new(seeder),
            public_dir,
        }
    }

    pub fn routes(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let cors = warp::cors()
            .allow_any_origin()
            .allow_methods(vec!["GET", "POST"])
            .allow_header("content-type");

        self.list_symptoms()
            .or(self.search_symptoms())
            .or(self.search_symptoms_by_path())
            .or(self.get_symptom())
            .or(self.list_patients())
            .or(self.create_patient())
            .or(self.migrate_symptoms())
            .or(docs::routes())
            .or(self.static_files())
            .recover(handle_rejection)
            .with(cors)
            .with(warp::trace::request())
    }

    fn list_symptoms(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let catalog = Arc::clone(&self.catalog);

        warp::path!("sintomas")
            .and(warp::get())
            .map(move || warp::reply::json(&catalog.all()))
    }

    fn get_symptom(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let catalog = Arc::clone(&self.catalog);

        warp::path!("sintomas" / i64)
            .and(warp::get())
            .and_then(move |id: i64| {
                let catalog = Arc::clone(&catalog);
                async move {
                    catalog
                        .get(id)
                        .map(|symptom| warp::reply::json(symptom))
                        .map_err(reject)
                }
            })
    }

    fn search_symptoms(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let catalog = Arc::clone(&self.catalog);

        warp::path!("sintomas" / "buscar")
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .and_then(move |params: HashMap<String, String>| {
                let catalog = Arc::clone(&catalog);
                async move {
                    let term = params
                        .get("nombre")
                        .ok_or_else(|| reject(RomiError::missing_search_term()))?;
                    catalog
                        .search(term)
                        .map(|matches| warp::reply::json(&matches))
                        .map_err(reject)
                }
            })
    }

    fn search_symptoms_by_path(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let catalog = Arc::clone(&self.catalog);

        warp::path!("sintomas" / "buscar" / String)
            .and(warp::get())
            .and_then(move |raw: String| {
                let catalog = Arc::clone(&catalog);
                async move {
                    let term = percent_encoding::percent_decode_str(&raw)
                        .decode_utf8()
                        .map_err(|_| reject(RomiError::InvalidInput("El parámetro 'nombre' no es UTF-8 válido".to_string())))?;
                    catalog
                        .search(&term)
                        .map(|matches| warp::reply::json(&matches))
                        .map_err(reject)
                }
            })
    }

    fn list_patients(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let patients = Arc::clone(&self.patients);

        warp::path!("pacientes")
            .and(warp::get())
            .and_then(move || {
                let patients = Arc::clone(&patients);
                async move {
                    patients
                        .list_all()
                        .await
                        .map(|records| warp::reply::json(&records))
                        .map_err(reject_with("Error al leer pacientes"))
                }
            })
    }

    fn create_patient(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let patients = Arc::clone(&self.patients);

        warp::path!("pacientes")
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::json())
            .and_then(move |intake: IntakeRequest| {
                let patients = Arc::clone(&patients);
                async move {
                    patients
                        .create(intake)
                        .await
                        .map(|receipt| warp::reply::json(&receipt))
                        .map_err(reject_with("Error al guardar paciente"))
                }
            })
    }

    /// Seed outcomes are plain text, failures included.
    fn migrate_symptoms(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let seeder = Arc::clone(&self.seeder);

        warp::path!("migrar-sintomas")
            .and(warp::get())
            .then(move || {
                let seeder = Arc::clone(&seeder);
                async move {
                    match seeder.seed_if_empty().await {
                        Ok(result) if result.migrated => warp::reply::with_status(
                            "Síntomas migrados al almacén de documentos (primera vez)".to_string(),
                            StatusCode::OK,
                        ),
                        Ok(_) => warp::reply::with_status(
                            "El almacén ya tenía síntomas. No se migró nada.".to_string(),
                            StatusCode::OK,
                        ),
                        Err(err) => {
                            tracing::error!(error = %err, "symptom migration failed");
                            warp::reply::with_status(format!("Error: {}", err), StatusCode::INTERNAL_SERVER_ERROR)
                        }
                    }
                }
            })
    }

    fn static_files(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let index = warp::path::end()
            .and(warp::get())
            .and(warp::fs::file(self.public_dir.join("index.html")));

        index.or(warp::get().and(warp::fs::dir(self.public_dir.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patients::tests::FailingStore;
    use crate::seed::SYMPTOMS_COLLECTION;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn api_with(store: Arc<dyn DocumentStore>, public_dir: PathBuf) -> RestApi {
        RestApi::new(Arc::new(SymptomCatalog::builtin()), store, public_dir)
    }

    fn api() -> RestApi {
        api_with(Arc::new(MemoryStore::new()), PathBuf::from("does-not-exist"))
    }

    fn json_body(res: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[tokio::test]
    async fn lists_all_symptoms() {
        let routes = api().routes();
        let res = warp::test::request().path("/sintomas").reply(&routes).await;
        assert_eq!(res.status(), 200);
        let body = json_body(&res);
        assert_eq!(body.as_array().unwrap().len(), 10);
        assert_eq!(body[0]["name"], "Dolor de cabeza");
    }

    #[tokio::test]
    async fn gets_symptom_by_id() {
        let routes = api().routes();
        let res = warp::test::request().path("/sintomas/4").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(json_body(&res)["name"], "Tos");

        let res = warp::test::request().path("/sintomas/42").reply(&routes).await;
        assert_eq!(res.status(), 404);
        assert_eq!(json_body(&res), json!({"error": "Síntoma no encontrado", "code": "NOT_FOUND"}));
    }

    #[tokio::test]
    async fn searches_by_query() {
        let routes = api().routes();
        let res = warp::test::request()
            .path("/sintomas/buscar?nombre=DOLOR")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 200);
        assert_eq!(json_body(&res).as_array().unwrap().len(), 4);

        let res = warp::test::request().path("/sintomas/buscar").reply(&routes).await;
        assert_eq!(res.status(), 400);
        assert_eq!(json_body(&res)["code"], "INVALID_INPUT");
        assert_eq!(json_body(&res)["error"], "Debes enviar un parámetro 'nombre'");

        let res = warp::test::request().path("/sintomas/buscar?nombre=").reply(&routes).await;
        assert_eq!(res.status(), 400);

        let res = warp::test::request()
            .path("/sintomas/buscar?nombre=xyzzy-no-match")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 404);
        assert_eq!(json_body(&res)["error"], "No se encontraron síntomas con ese nombre");
    }

    #[tokio::test]
    async fn searches_by_path_with_encoding() {
        let routes = api().routes();
        let res = warp::test::request()
            .path("/sintomas/buscar/de%20garganta")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 200);
        let body = json_body(&res);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], 8);

        let res = warp::test::request().path("/sintomas/buscar/n%C3%A1useas").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(json_body(&res)[0]["id"], 9);
    }

    #[tokio::test]
    async fn intake_round_trip() {
        let routes = api().routes();
        let res = warp::test::request()
            .method("POST")
            .path("/pacientes")
            .json(&json!({"nombre": "Ana", "sintomaId": 1, "nivelDolor": 2}))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 200);
        let receipt = json_body(&res);
        assert_eq!(receipt["nombre"], "Ana");
        assert_eq!(receipt["sintoma"], "Dolor de cabeza");
        assert_eq!(receipt["recomendaciones"], json!(["Descansar", "Tomar agua"]));
        assert_eq!(receipt["alerta"], false);

        let res = warp::test::request().path("/pacientes").reply(&routes).await;
        assert_eq!(res.status(), 200);
        let records = json_body(&res);
        assert_eq!(records.as_array().unwrap().len(), 1);
        assert_eq!(records[0]["id"], receipt["id"]);
        assert_eq!(records[0]["sintomaNombre"], "Dolor de cabeza");
        assert!(records[0]["fecha"].is_string());
    }

    #[tokio::test]
    async fn intake_errors_map_to_statuses() {
        let routes = api().routes();

        let res = warp::test::request()
            .method("POST")
            .path("/pacientes")
            .json(&json!({"nombre": "Ana", "sintomaId": 77, "nivelDolor": 2}))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 404);

        let res = warp::test::request()
            .method("POST")
            .path("/pacientes")
            .json(&json!({"nombre": "Ana", "sintomaId": 1, "nivelDolor": 11}))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 400);
        assert_eq!(json_body(&res), json!({"error": "Nivel de dolor no válido", "code": "INVALID_RANGE"}));

        let res = warp::test::request()
            .method("POST")
            .path("/pacientes")
            .json(&json!({"nombre": "Ana", "sintomaId": "uno", "nivelDolor": 2}))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 400);
        assert_eq!(json_body(&res)["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn storage_failures_are_500() {
        let routes = api_with(Arc::new(FailingStore::default()), PathBuf::from("none")).routes();

        let res = warp::test::request()
            .method("POST")
            .path("/pacientes")
            .json(&json!({"nombre": "Ana", "sintomaId": 1, "nivelDolor": 2}))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 500);
        assert_eq!(json_body(&res), json!({"error": "Error al guardar paciente", "code": "STORAGE_ERROR"}));

        let res = warp::test::request().path("/pacientes").reply(&routes).await;
        assert_eq!(res.status(), 500);
        assert_eq!(json_body(&res)["error"], "Error al leer pacientes");

        let res = warp::test::request().path("/migrar-sintomas").reply(&routes).await;
        assert_eq!(res.status(), 500);
        assert!(std::str::from_utf8(res.body()).unwrap().starts_with("Error:"));
    }

    #[tokio::test]
    async fn migration_runs_once() {
        let store = Arc::new(MemoryStore::new());
        let routes = api_with(store.clone(), PathBuf::from("none")).routes();

        let res = warp::test::request().path("/migrar-sintomas").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(
            std::str::from_utf8(res.body()).unwrap(),
            "Síntomas migrados al almacén de documentos (primera vez)"
        );
        assert_eq!(store.get(SYMPTOMS_COLLECTION).await.unwrap().len(), 10);

        let res = warp::test::request().path("/migrar-sintomas").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(
            std::str::from_utf8(res.body()).unwrap(),
            "El almacén ya tenía síntomas. No se migró nada."
        );
    }

    #[tokio::test]
    async fn serves_landing_page() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>ROMI</h1>").unwrap();
        let routes = api_with(Arc::new(MemoryStore::new()), dir.path().to_path_buf()).routes();

        let res = warp::test::request().path("/").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.body().as_ref(), b"<h1>ROMI</h1>");
    }

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let routes = api().routes();
        let res = warp::test::request().path("/nope").reply(&routes).await;
        assert_eq!(res.status(), 404);
        assert_eq!(json_body(&res)["error"], "Ruta no encontrada");
    }
}
