use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000u16);
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    println!("table api listening on {}", listener.local_addr()?);
    mock_server::run(listener).await
}
