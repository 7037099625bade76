use chrono::{Local, NaiveDate};

#[macro_export]
macro_rules! get_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[get($url)]
                async fn $func_name(
                    state: web::Data<AppState>,
                    info: web::Query<$request>
                ) -> impl Responder {
                    let response = match [<$func_name _impl>](state, info).await {
                        Ok(response) => response,
                        Err(err) => {
                            tracing::warn!(handler = stringify!($func_name), "{:#}", err);
                            <$response>::err(err.to_string())
                        }
                    };
                    HttpResponse::Ok().json(response)
                }
            }
        )+
    };
}

/// Calendar date at the observatory host.
pub fn today() -> NaiveDate {
    Local::now().naive_local().date()
}
