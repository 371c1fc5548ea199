#[tokio::main]
async fn main() {
    if let Err(e) = theta_assistant_lib::run().await {
        eprintln!("theta-assistant: {e}");
        std::process::exit(1);
    }
}
