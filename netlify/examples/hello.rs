use netlify_functions::{netlify, Context, Request, Response};

// The #[netlify] attribute removes the registration boilerplate required
// by `netlify_functions::start(handler).await` as demonstrated in the
// hello-without-macro example.

#[netlify]
#[tokio::main]
async fn main(_: Request, _: Context) -> Response {
    Response::text("Hello Netlify")
}
