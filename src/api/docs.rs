//! OpenAPI document and the Swagger UI page that renders it.

use serde_json::{json, Value};
use warp::Filter;

use crate::config::APP_VERSION;

const DOCS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>API Docs - ROMI</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist/swagger-ui-bundle.js"></script>
  <script src="https://unpkg.com/swagger-ui-dist/swagger-ui-standalone-preset.js"></script>
  <script>
    window.onload = () => {
      SwaggerUIBundle({
        url: '/swagger.json',
        dom_id: '#swagger-ui',
        presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
        layout: "BaseLayout"
      });
    };
  </script>
</body>
</html>
"#;

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
    })
}

pub fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "API ROMI",
            "version": APP_VERSION,
            "description": "Symptom catalog and patient intake with pain-level recommendations."
        },
        "paths": paths(),
        "components": { "schemas": schemas() }
    })
}

fn paths() -> Value {
    json!({
        "/sintomas": {
            "get": {
                "summary": "List every symptom",
                "responses": {
                    "200": {
                        "description": "All symptoms in catalog order",
                        "content": { "application/json": { "schema": {
                            "type": "array", "items": { "$ref": "#/components/schemas/Symptom" }
                        } } }
                    }
                }
            }
        },
        "/sintomas/{id}": {
            "get": {
                "summary": "Get a symptom by id",
                "parameters": [{ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }],
                "responses": {
                    "200": {
                        "description": "The symptom",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Symptom" } } }
                    },
                    "404": error_response("Unknown symptom id")
                }
            }
        },
        "/sintomas/buscar": {
            "get": {
                "summary": "Search symptoms by name (case-insensitive substring)",
                "parameters": [{ "name": "nombre", "in": "query", "required": true, "schema": { "type": "string" } }],
                "responses": {
                    "200": { "description": "Matching symptoms" },
                    "400": error_response("Missing or empty 'nombre'"),
                    "404": error_response("No symptom matches")
                }
            }
        },
        "/sintomas/buscar/{nombre}": {
            "get": {
                "summary": "Search symptoms by name, path form",
                "parameters": [{ "name": "nombre", "in": "path", "required": true, "schema": { "type": "string" } }],
                "responses": {
                    "200": { "description": "Matching symptoms" },
                    "404": error_response("No symptom matches")
                }
            }
        },
        "/pacientes": {
            "get": {
                "summary": "List recorded patient intakes",
                "responses": {
                    "200": {
                        "description": "All intakes",
                        "content": { "application/json": { "schema": {
                            "type": "array", "items": { "$ref": "#/components/schemas/PatientRecord" }
                        } } }
                    },
                    "500": error_response("Storage failure")
                }
            },
            "post": {
                "summary": "Record a patient intake and get recommendations",
                "requestBody": {
                    "required": true,
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Intake" } } }
                },
                "responses": {
                    "200": {
                        "description": "Stored intake with recommendations",
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/IntakeReceipt" } } }
                    },
                    "400": error_response("Pain level outside every tier or malformed body"),
                    "404": error_response("Unknown symptom id"),
                    "500": error_response("Storage failure")
                }
            }
        },
        "/migrar-sintomas": {
            "get": {
                "summary": "Copy the symptom catalog into the store if it is empty",
                "responses": {
                    "200": { "description": "Migrated or skipped", "content": { "text/plain": {} } },
                    "500": { "description": "Storage failure", "content": { "text/plain": {} } }
                }
            }
        }
    })
}

fn schemas() -> Value {
    json!({
        "Tier": {
            "type": "object",
            "properties": {
                "painLevel": { "type": "array", "items": { "type": "integer" }, "minItems": 2, "maxItems": 2 },
                "recommendations": { "type": "array", "items": { "type": "string" } },
                "alert": { "type": "boolean" }
            }
        },
        "Symptom": {
            "type": "object",
            "properties": {
                "id": { "type": "integer" },
                "name": { "type": "string" },
                "categories": { "type": "array", "items": { "type": "string" } },
                "solutions": { "type": "array", "items": { "$ref": "#/components/schemas/Tier" } }
            }
        },
        "Intake": {
            "type": "object",
            "required": ["nombre", "sintomaId", "nivelDolor"],
            "properties": {
                "nombre": { "type": "string" },
                "sintomaId": { "type": "integer" },
                "nivelDolor": { "type": "integer", "minimum": 1, "maximum": 10 }
            }
        },
        "IntakeReceipt": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "nombre": { "type": "string" },
                "sintoma": { "type": "string" },
                "recomendaciones": { "type": "array", "items": { "type": "string" } },
                "alerta": { "type": "boolean" }
            }
        },
        "PatientRecord": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "nombre": { "type": "string" },
                "sintomaId": { "type": "integer" },
                "nivelDolor": { "type": "integer" },
                "fecha": { "type": "string", "format": "date-time" },
                "sintomaNombre": { "type": "string" }
            }
        },
        "Error": {
            "type": "object",
            "properties": {
                "error": { "type": "string" },
                "code": { "type": "string" }
            }
        }
    })
}

pub fn routes() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let document = warp::path!("swagger.json")
        .and(warp::get())
        .map(|| warp::reply::json(&openapi_document()));

    let page = warp::path!("api-docs")
        .and(warp::get())
        .map(|| warp::reply::html(DOCS_PAGE));

    document.or(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = openapi_document();
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/sintomas",
            "/sintomas/{id}",
            "/sintomas/buscar",
            "/sintomas/buscar/{nombre}",
            "/pacientes",
            "/migrar-sintomas",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
        assert!(doc["paths"]["/pacientes"]["post"].is_object());
    }

    #[tokio::test]
    async fn serves_document_and_page() {
        let filter = routes();

        let res = warp::test::request().path("/swagger.json").reply(&filter).await;
        assert_eq!(res.status(), 200);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["openapi"], "3.0.0");

        let res = warp::test::request().path("/api-docs").reply(&filter).await;
        assert_eq!(res.status(), 200);
        assert!(std::str::from_utf8(res.body()).unwrap().contains("swagger-ui"));
    }
}
