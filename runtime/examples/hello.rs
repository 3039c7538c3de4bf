use netlify_runtime::{handler_fn, run, Context, Error};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Error> {
    run(handler_fn(func)).await?;
    Ok(())
}

async fn func(_: Value, _: Context) -> Result<String, Error> {
    Ok("hello world".to_string())
}
