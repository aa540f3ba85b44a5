// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

// Anexo I escaneado pode passar do limite padrão de 2 MB
const LIMITE_UPLOAD: usize = 20 * 1024 * 1024;

pub fn app(app_state: AppState) -> Router {
    let anexo2_routes = Router::new()
        .route("/preview", post(handlers::anexo2::preview))
        .route("/generate", post(handlers::anexo2::generate))
        .route(
            "/prefill-from-anexo1",
            post(handlers::anexo2::prefill_from_anexo1).layer(DefaultBodyLimit::max(LIMITE_UPLOAD)),
        )
        // Assistente
        .route("/chat", post(handlers::chat::iniciar_chat))
        .route(
            "/chat/{id}",
            post(handlers::chat::responder_chat).delete(handlers::chat::encerrar_chat),
        )
        .route("/form/validate", post(handlers::formulario::validar_passo));

    let draft_routes = Router::new()
        .route("/", post(handlers::drafts::create_draft))
        .route(
            "/{id}",
            get(handlers::drafts::get_draft).patch(handlers::drafts::patch_draft),
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(handlers::anexo2::health))
        .route("/api/server-date", get(handlers::anexo2::server_date))
        .nest("/api/anexo2", anexo2_routes)
        .nest("/api/drafts", draft_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            bind_addr: "127.0.0.1:0".into(),
            data_dir: dir.path().join("data"),
            fonts_dir: dir.path().join("fonts"),
            font_family: "Roboto".into(),
            prazo_dias: 5,
            soffice_bin: "soffice".into(),
        };
        let state = AppState::new(&config).await.unwrap();
        (app(state), dir)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_e_data_do_servidor() {
        let (app, _dir) = test_app().await;

        let resp = app
            .clone()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(Request::get("/api/server-date").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(resp).await;
        let data = body["date"].as_str().unwrap();
        assert!(chrono::NaiveDate::parse_from_str(data, "%Y-%m-%d").is_ok());
    }

    #[tokio::test]
    async fn preview_de_payload_vazio_lista_pendencias() {
        let (app, _dir) = test_app().await;
        let resp = app
            .oneshot(json_request(Method::POST, "/api/anexo2/preview", json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert!(!body["errors"].as_array().unwrap().is_empty());
        assert!(body.get("placeholders").is_none());
    }

    #[tokio::test]
    async fn generate_com_pendencias_devolve_422_com_o_preview() {
        let (app, _dir) = test_app().await;
        let resp = app
            .oneshot(json_request(Method::POST, "/api/anexo2/generate?format=pdf", json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(resp).await;
        assert_eq!(body["detail"]["ok"], false);
        assert!(body["detail"]["errors"].is_array());
    }

    #[tokio::test]
    async fn generate_docx_devolve_anexo() {
        let (app, _dir) = test_app().await;
        let payload = json!({
            "data_relatorio": "2024-03-12",
            "proposto": {
                "nome": "Maria da Silva",
                "cpf": "529.982.247-25",
                "siape": "1234567",
                "orgao": { "tipo": "cchsa" }
            },
            "afastamento": {
                "ida": [{ "origem": "Bananeiras/PB", "destino": "João Pessoa/PB", "data_hora": "2024-03-05T06:00" }],
                "retorno": [{ "origem": "João Pessoa/PB", "destino": "Bananeiras/PB", "data_hora": "2024-03-08T18:00" }]
            },
            "atividades_desenvolvidas": "Participação no seminário regional de extensão.",
            "viagem_realizada": "sim"
        });
        let resp = app
            .oneshot(json_request(Method::POST, "/api/anexo2/generate", payload))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"anexo2_preenchido.docx\""
        );
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn prefill_sem_arquivo_e_400() {
        let (app, _dir) = test_app().await;
        let corpo = "--limite\r\nContent-Disposition: form-data; name=\"outro\"\r\n\r\nx\r\n--limite--\r\n";
        let req = Request::post("/api/anexo2/prefill-from-anexo1")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=limite")
            .body(Body::from(corpo))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["detail"], "Envie o Anexo I no campo 'file'.");
    }

    #[tokio::test]
    async fn rascunho_criado_mesclado_e_lido() {
        let (app, _dir) = test_app().await;

        let resp = app
            .clone()
            .oneshot(Request::post("/api/drafts?kind=anexo2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let id = body_json(resp).await["draft_id"].as_str().unwrap().to_string();

        let resp = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/drafts/{id}"),
                json!({ "proposto": { "nome": "Maria" } }),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await, json!({ "ok": true }));

        let resp = app
            .oneshot(Request::get(format!("/api/drafts/{id}")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["kind"], "anexo2");
        assert_eq!(body["data"]["proposto"]["nome"], "Maria");
    }

    #[tokio::test]
    async fn rascunho_inexistente_e_404() {
        let (app, _dir) = test_app().await;
        let uri = format!("/api/drafts/{}", uuid::Uuid::new_v4());
        let resp = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["detail"], "Rascunho não encontrado.");
    }

    #[tokio::test]
    async fn conversa_pergunta_responde_e_encerra() {
        let (app, _dir) = test_app().await;

        let resp = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/anexo2/chat",
                json!({ "data_relatorio": "12/03/2024" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        let id = body["sessao_id"].as_str().unwrap().to_string();
        assert_eq!(body["pergunta"]["estado"], "proposto_nome");
        assert_eq!(body["mensagens"][0], "Usar data atual: 12/03/2024.");

        let resp = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/api/anexo2/chat/{id}"),
                json!({ "resposta": "Maria da Silva" }),
            ))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["pergunta"]["estado"], "proposto_cpf");
        assert_eq!(body["concluido"], false);

        let resp = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/anexo2/chat/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app
            .oneshot(json_request(
                Method::POST,
                &format!("/api/anexo2/chat/{id}"),
                json!({ "resposta": "52998224725" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn valida_passo_do_formulario() {
        let (app, _dir) = test_app().await;

        let resp = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/anexo2/form/validate?step=2", json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["popup"], "proposto.nome");

        let resp = app
            .oneshot(json_request(Method::POST, "/api/anexo2/form/validate?step=9", json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valida_passo_recusa_trecho_fora_do_limite() {
        let (app, _dir) = test_app().await;

        let resp = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/anexo2/form/validate?step=3",
                json!({ "afastamento.ida.2000000000.origem_uf": "PB" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(body["detail"].as_str().unwrap().contains("afastamento.ida.2000000000.origem_uf"));

        let resp = app
            .oneshot(json_request(
                Method::POST,
                "/api/anexo2/form/validate?step=2",
                json!({ "proposto.apelido": "Mari" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn conversa_concluida_sai_do_mapa() {
        let (app, _dir) = test_app().await;

        let resp = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/anexo2/chat",
                json!({ "data_relatorio": "08/03/2024" }),
            ))
            .await
            .unwrap();
        let id = body_json(resp).await["sessao_id"].as_str().unwrap().to_string();
        let uri = format!("/api/anexo2/chat/{id}");

        let respostas = [
            "Maria da Silva",
            "52998224725",
            "1234567",
            "cchsa",
            "Bananeiras/PB",
            "Recife/PE",
            "05/03/2024 08:00",
            "usar",
            "usar",
            "07/03/2024 18:00",
            "sim",
            "modelo",
            "reuniao",
            "aplicar",
        ];
        let mut ultimo = Value::Null;
        for resposta in respostas {
            let resp = app
                .clone()
                .oneshot(json_request(Method::POST, &uri, json!({ "resposta": resposta })))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            ultimo = body_json(resp).await;
        }
        assert_eq!(ultimo["concluido"], true);
        assert_eq!(ultimo["payload"]["proposto"]["nome"], "Maria da Silva");

        let resp = app
            .oneshot(json_request(Method::POST, &uri, json!({ "resposta": "aplicar" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
