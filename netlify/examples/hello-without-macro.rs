use netlify_functions::{Context, Error, Request, Response};

#[tokio::main]
async fn main() -> Result<(), Error> {
    netlify_functions::start(handler).await?;
    Ok(())
}

async fn handler(_: Request, _: Context) -> Response {
    Response::text("Hello Netlify")
}
