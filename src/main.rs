#[tokio::main]
async fn main() {
    tourney_engine_be::start_server().await;
}
