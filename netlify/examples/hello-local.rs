use netlify_functions::{local, Context, Error, Request, Response};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();
    local::serve(handler).await
}

async fn handler(request: Request, _: Context) -> Response {
    Response::text(format!("Hello {}", request.path))
}
