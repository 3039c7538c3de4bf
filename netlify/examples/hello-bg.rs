use netlify_functions::{netlify, Context, Error, Request};

#[netlify(bg)]
#[tokio::main]
async fn main(request: Request, context: Context) -> Result<(), Error> {
    println!("processing {} as invocation {}", request.path, context.request_id);
    Ok(())
}
