#[tokio::main]
async fn main() {
    coworking_backend::run().await;
}
