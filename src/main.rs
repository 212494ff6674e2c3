#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = polar_property::app::run().await {
        tracing::error!(error = %err, "Fatal startup error");
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            err.to_string(),
        ));
    }
    Ok(())
}
