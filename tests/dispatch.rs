//! Resource handler over the in-memory stores.

use axum::http::{Method, StatusCode};
use petshop::codec::decode;
use petshop::{dispatch, ApiResponse, AppState};
use serde_json::Value;

const ANA: &str = r#"{"nome":"Ana Souza","cpf":"529.982.247-25","email":"Ana@Example.com","telefone":"(11) 98765-4321"}"#;

async fn call(state: &AppState, method: Method, path: &str, body: &str) -> ApiResponse {
    dispatch(state, &method, path, body).await
}

fn json(response: &ApiResponse) -> Value {
    serde_json::from_str(&response.body).unwrap()
}

async fn create_customer(state: &AppState) -> i64 {
    let r = call(state, Method::POST, "/api/clientes", ANA).await;
    assert_eq!(r.status, StatusCode::CREATED, "{}", r.body);
    json(&r)["idCliente"].as_i64().unwrap()
}

// === customers ===

#[tokio::test]
async fn test_customer_crud_cycle() {
    let state = AppState::in_memory();
    let id = create_customer(&state).await;

    let r = call(&state, Method::GET, &format!("/api/clientes/{id}"), "").await;
    assert_eq!(r.status, StatusCode::OK);
    let body = json(&r);
    assert_eq!(body["cpf"], "52998224725");
    assert_eq!(body["email"], "ana@example.com");
    assert!(body["dataCadastro"].is_string());

    let r = call(
        &state,
        Method::PUT,
        &format!("/api/clientes/{id}"),
        r#"{"nome":"Ana Maria","cpf":"52998224725","email":"ana@example.com","endereco":"Rua A, 10"}"#,
    )
    .await;
    assert_eq!(r.status, StatusCode::OK, "{}", r.body);
    let body = json(&r);
    assert_eq!(body["nome"], "Ana Maria");
    assert_eq!(body["idCliente"].as_i64(), Some(id));
    assert_eq!(body["telefone"], Value::Null);

    let r = call(&state, Method::DELETE, &format!("/api/clientes/{id}"), "").await;
    assert_eq!(r.status, StatusCode::OK);
    assert!(json(&r)["mensagem"].is_string());

    let r = call(&state, Method::DELETE, &format!("/api/clientes/{id}"), "").await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    assert!(json(&r)["erro"].is_string());
}

#[tokio::test]
async fn test_invalid_national_id_is_rejected() {
    let state = AppState::in_memory();
    let r = call(
        &state,
        Method::POST,
        "/api/clientes",
        r#"{"nome":"Ana","cpf":"111.111.111-11","email":"ana@example.com"}"#,
    )
    .await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&r)["campo"], "cpf");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let state = AppState::in_memory();
    for body in [r#"{"nome":"Ana"#, r#""nome":"Ana""#, r#"{"nome":{"first":"Ana"}}"#] {
        let r = call(&state, Method::POST, "/api/clientes", body).await;
        assert_eq!(r.status, StatusCode::BAD_REQUEST, "{body}");
    }
    let r = call(&state, Method::GET, "/api/clientes", "").await;
    assert_eq!(r.body, "[]");
}

#[tokio::test]
async fn test_missing_records() {
    let state = AppState::in_memory();
    let r = call(&state, Method::GET, "/api/clientes/77", "").await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    let r = call(&state, Method::PUT, "/api/produtos/5", r#"{"nome":"Bola","preco":"10"}"#).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    let r = call(&state, Method::GET, "/api/clientes/abc", "").await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    let r = call(&state, Method::GET, "/api/vendas", "").await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
}

// === pets ===

#[tokio::test]
async fn test_pet_requires_existing_owner() {
    let state = AppState::in_memory();
    let r = call(&state, Method::POST, "/api/pets", r#"{"idCliente":9,"nome":"Rex","especie":"cao"}"#).await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&r)["campo"], "idCliente");

    let owner = create_customer(&state).await;
    let r = call(
        &state,
        Method::POST,
        "/api/pets",
        &format!(r#"{{"idCliente":{owner},"nome":"Rex","especie":"cao","peso":"12.5"}}"#),
    )
    .await;
    assert_eq!(r.status, StatusCode::CREATED, "{}", r.body);
    let fields = decode(&r.body).unwrap();
    assert_eq!(fields["especie"], "CAO");
    assert_eq!(fields["peso"], "12.5");
}

#[tokio::test]
async fn test_pets_by_customer_and_orphans() {
    let state = AppState::in_memory();
    let owner = create_customer(&state).await;
    for name in ["Rex", "Bob"] {
        let body = format!(r#"{{"idCliente":"{owner}","nome":"{name}","especie":"cao"}}"#);
        let r = call(&state, Method::POST, "/api/pets", &body).await;
        assert_eq!(r.status, StatusCode::CREATED);
    }

    let r = call(&state, Method::GET, &format!("/api/pets/cliente/{owner}"), "").await;
    let pets = json(&r);
    let names: Vec<&str> = pets.as_array().unwrap().iter().map(|p| p["nome"].as_str().unwrap()).collect();
    assert_eq!(names, ["Bob", "Rex"]);

    let r = call(&state, Method::DELETE, &format!("/api/clientes/{owner}"), "").await;
    assert_eq!(r.status, StatusCode::OK);
    let r = call(&state, Method::GET, "/api/pets", "").await;
    assert_eq!(json(&r).as_array().unwrap().len(), 2);
}

// === staff ===

#[tokio::test]
async fn test_staff_compensation_and_role_lookup() {
    let state = AppState::in_memory();
    for (name, role) in [("Vera", "VETERINARIO"), ("Tito", "tosador"), ("Alice", "")] {
        let body = format!(
            r#"{{"nome":"{name}","cpf":"12345678900","email":"{name}@petshop.com","cargo":"{role}","salarioBase":1000}}"#
        );
        let r = call(&state, Method::POST, "/api/funcionarios", &body).await;
        assert_eq!(r.status, StatusCode::CREATED, "{}", r.body);
    }

    let r = call(&state, Method::GET, "/api/funcionarios/cargo/veterinario", "").await;
    let vets = json(&r);
    assert_eq!(vets.as_array().unwrap().len(), 1);
    assert_eq!(vets[0]["salarioCalculado"].as_f64(), Some(1500.0));

    let r = call(&state, Method::GET, "/api/funcionarios/cargo/ATENDENTE", "").await;
    let desk = json(&r);
    assert_eq!(desk[0]["nome"], "Alice");
    assert_eq!(desk[0]["salarioCalculado"].as_f64(), Some(1000.0));

    let r = call(&state, Method::GET, "/api/funcionarios/cargo/GERENTE", "").await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_role_on_create() {
    let state = AppState::in_memory();
    let r = call(
        &state,
        Method::POST,
        "/api/funcionarios",
        r#"{"nome":"Gil","cpf":"12345678900","email":"gil@petshop.com","cargo":"GERENTE"}"#,
    )
    .await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&r)["campo"], "cargo");
}

// === products ===

#[tokio::test]
async fn test_products_by_category() {
    let state = AppState::in_memory();
    for (name, category) in [("Racao Premium", "racao"), ("Bola", "brinquedo"), ("Racao Filhote", "RACAO")] {
        let body = format!(r#"{{"nome":"{name}","preco":"49.90","categoria":"{category}"}}"#);
        let r = call(&state, Method::POST, "/api/produtos", &body).await;
        assert_eq!(r.status, StatusCode::CREATED, "{}", r.body);
        assert_eq!(json(&r)["estoque"].as_i64(), Some(0));
    }
    let r = call(&state, Method::GET, "/api/produtos/categoria/Racao", "").await;
    assert_eq!(json(&r).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_encoded_category_in_path() {
    let state = AppState::in_memory();
    let r = call(&state, Method::POST, "/api/produtos", r#"{"nome":"Petisco","preco":5,"categoria":"ração"}"#).await;
    assert_eq!(r.status, StatusCode::CREATED, "{}", r.body);
    let r = call(&state, Method::GET, "/api/produtos/categoria/ra%C3%A7%C3%A3o", "").await;
    assert_eq!(r.status, StatusCode::OK);
    let found = json(&r);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["categoria"], "RAÇÃO");
}

// === methods ===

#[tokio::test]
async fn test_options_and_unsupported_methods() {
    let state = AppState::in_memory();
    let r = call(&state, Method::OPTIONS, "/api/pets", "").await;
    assert_eq!(r.status, StatusCode::OK);
    assert!(r.body.is_empty());

    let r = call(&state, Method::PATCH, "/api/pets/1", "").await;
    assert_eq!(r.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(r.content_type, "text/plain");

    let r = call(&state, Method::DELETE, "/api/pets", "").await;
    assert_eq!(r.status, StatusCode::METHOD_NOT_ALLOWED);
}
