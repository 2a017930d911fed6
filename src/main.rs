#[tokio::main]
async fn main() {
    checkin_backend::run().await;
}
