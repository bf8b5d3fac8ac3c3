use actix_web::{get, post, web, App, HttpResponse, HttpServer};
use clap::Parser;
use tracing::info;

use face_store::actions::{self, DbPool};
use face_store::config::{
    ServerConfig, StoreConfig, DEFAULT_BIND, DEFAULT_DATABASE_PATH, DEFAULT_JSON_LIMIT,
    DEFAULT_TABLE_NAME,
};
use face_store::dtos::{DataDto, MessageDto, UploadDto};
use face_store::errors::{ApiError, StoreError};
use face_store::models::Record;

#[derive(Parser, Debug)]
#[command(name = "face_store", about = "Stores labelled images posted as JSON")]
struct Args {
    /// SQLite database file
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_PATH)]
    database: String,

    #[arg(long, env = "FACE_STORE_TABLE", default_value = DEFAULT_TABLE_NAME)]
    table: String,

    /// Address to listen on
    #[arg(long, env = "FACE_STORE_BIND", default_value = DEFAULT_BIND)]
    bind: String,

    /// Largest JSON body accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_JSON_LIMIT)]
    json_limit: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            bind: args.bind,
            store: StoreConfig::new(args.database, args.table),
            json_limit: args.json_limit,
        }
    }
}

#[post("/upload")]
async fn upload_data(
    pool: web::Data<DbPool>,
    store: web::Data<StoreConfig>,
    model: web::Json<UploadDto>,
) -> Result<HttpResponse, ApiError> {
    let record = model.into_inner().into_new_record().map_err(ApiError::upload)?;
    let name = record.name.clone();
    let table = store.table_name.clone();
    let id = web::block(move || -> Result<i64, StoreError> {
        let mut conn = pool.get()?;
        actions::insert_record(&mut conn, &table, record)
    })
    .await
    .map_err(ApiError::upload)?
    .map_err(ApiError::upload)?;

    info!(id, name = %name, "stored record");
    Ok(HttpResponse::Ok().json(MessageDto {
        message: "Data uploaded successfully".to_string(),
    }))
}

#[get("/get_data")]
async fn get_data(
    pool: web::Data<DbPool>,
    store: web::Data<StoreConfig>,
) -> Result<HttpResponse, ApiError> {
    let table = store.table_name.clone();
    let records = web::block(move || -> Result<Vec<Record>, StoreError> {
        let mut conn = pool.get()?;
        actions::list_records(&mut conn, &table)
    })
    .await
    .map_err(ApiError::list)?
    .map_err(ApiError::list)?;

    info!(count = records.len(), "listed records");
    Ok(HttpResponse::Ok().json(DataDto::from(records)))
}

/// Routes plus shared state; used by `main` and by the tests.
fn configure(
    pool: DbPool,
    store: StoreConfig,
    json_limit: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(pool))
            .app_data(web::Data::new(store))
            .app_data(
                web::JsonConfig::default()
                    .limit(json_limit)
                    .error_handler(|err, _req| {
                        ApiError::upload(StoreError::Payload(err.to_string())).into()
                    }),
            )
            .service(upload_data)
            .service(get_data);
    }
}

/// Builds the pool and creates the table once, before any request is served.
fn open_store(store: &StoreConfig) -> Result<DbPool, StoreError> {
    let pool = actions::build_pool(store)?;
    let mut conn = pool.get()?;
    actions::init_schema(&mut conn, &store.table_name)?;
    let existing = actions::count_records(&mut conn, &store.table_name)?;
    info!(
        database = %store.database_path.display(),
        table = %store.table_name,
        existing,
        "store ready"
    );
    Ok(pool)
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    face_store::init_tracing();

    let config = ServerConfig::from(Args::parse());
    let pool = open_store(&config.store).map_err(std::io::Error::other)?;

    info!(bind = %config.bind, "listening");
    let store = config.store.clone();
    let json_limit = config.json_limit;
    HttpServer::new(move || App::new().configure(configure(pool.clone(), store.clone(), json_limit)))
        .bind(&config.bind)?
        .run()
        .await
}
