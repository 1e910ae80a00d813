use axum::Router;

pub async fn create_test_app() -> Router {
    std::env::set_var("NODE_ENV", "test");
    std::env::set_var("DATABASE_URL", "");

    lingohub_backend::create_app().await
}
