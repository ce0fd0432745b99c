mod config;

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde::Deserialize;

use rs_markov_core::io::{append_line, normalize_line};
use rs_markov_core::registry::Registry;
use rs_markov_core::{formula, spoiler, Model};

use crate::config::Config;

/// Query parameters for the `/v1/learn` endpoint
#[derive(Deserialize)]
struct LearnParams {
	/// Answer with a generated sentence, like a mention in chat.
	reply: Option<bool>,
}

#[derive(Deserialize)]
struct RegistryParams {
	user: Option<String>,
	fields: Option<String>,
}

#[derive(Deserialize)]
struct HelpQuery {
	field: Option<String>,
}

#[derive(Deserialize)]
struct FormulaQuery {
	text: Option<String>,
}

/// State shared by every worker.
///
/// The model sits behind a `RwLock`: generation runs under the shared lock,
/// learning (append to corpus, then learn) under the exclusive one, so the
/// corpus order always matches the learning order.
struct SharedData {
	model: RwLock<Model>,
	registry: Mutex<Registry>,
	corpus_path: PathBuf,
}

impl SharedData {
	fn new(model: Model, corpus_path: PathBuf) -> Self {
		Self {
			model: RwLock::new(model),
			registry: Mutex::new(Registry::new()),
			corpus_path,
		}
	}
}

/// Returns a non-empty, trimmed parameter or a `400` body.
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, HttpResponse> {
	match value {
		Some(s) if !s.trim().is_empty() => Ok(s.trim()),
		_ => Err(HttpResponse::BadRequest().body(format!("Missing or empty {name}"))),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns a generated sentence as the response body (empty if nothing was learned yet).
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>) -> impl Responder {
	let model = match data.model.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(model.generate())
}

/// HTTP POST endpoint `/v1/learn`
///
/// Every non-empty line of the body is appended to the corpus, then learned.
/// Trailing `\r`s are stripped first so a restart rebuilds the same model.
#[post("/v1/learn")]
async fn post_learn(data: web::Data<SharedData>, query: web::Query<LearnParams>, body: String) -> impl Responder {
	let mut model = match data.model.write() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	for line in body.lines().map(normalize_line).filter(|l| !l.is_empty()) {
		if let Err(e) = append_line(&data.corpus_path, line) {
			error!("failed to append to {}: {e}", data.corpus_path.display());
			return HttpResponse::InternalServerError().body(format!("Failed to persist message: {e}"));
		}
		model.learn(line);
	}

	if query.reply.unwrap_or(false) {
		HttpResponse::Ok().body(model.generate())
	} else {
		HttpResponse::Ok().finish()
	}
}

/// Route list, the HTTP counterpart of the chat `!help` command.
const HELP: &str = "List of endpoints:\n\
	GET  /v1/generate - a sentence from the Markov model\n\
	POST /v1/learn?reply=<bool> - learn the body (one message per line)\n\
	GET  /v1/stats - model size as JSON\n\
	GET  /v1/spoiler - a random spoiler\n\
	GET  /v1/formula?text=<text> - render URLs for every $...$ formula\n\
	PUT  /v1/registry/register?user=<user>&fields=<a,b> - register proficiencies\n\
	PUT  /v1/registry/unregister?user=<user>&fields=<a,b> - unregister proficiencies\n\
	GET  /v1/registry/user?user=<user> - proficiencies of a user\n\
	GET  /v1/registry/help?field=<field> - everyone registered for a proficiency\n\
	GET  /v1/help - this list";

#[get("/v1/help")]
async fn get_help_text() -> impl Responder {
	HttpResponse::Ok().body(HELP)
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<SharedData>) -> impl Responder {
	match data.model.read() {
		Ok(model) => HttpResponse::Ok().json(model.stats()),
		Err(_) => HttpResponse::InternalServerError().body("Model lock failed"),
	}
}

#[get("/v1/spoiler")]
async fn get_spoiler() -> impl Responder {
	HttpResponse::Ok().body(spoiler::random_spoiler())
}

/// HTTP GET endpoint `/v1/formula`
///
/// One render URL per `$...$` formula of `text`, newline separated.
#[get("/v1/formula")]
async fn get_formula(query: web::Query<FormulaQuery>) -> impl Responder {
	let text = match required(&query.text, "text") {
		Ok(t) => t,
		Err(response) => return response,
	};
	HttpResponse::Ok().body(formula::render_urls(text).join("\n"))
}

#[put("/v1/registry/register")]
async fn put_register(data: web::Data<SharedData>, query: web::Query<RegistryParams>) -> impl Responder {
	let (user, fields) = match (required(&query.user, "user"), required(&query.fields, "fields")) {
		(Ok(u), Ok(f)) => (u, f),
		(Err(response), _) | (_, Err(response)) => return response,
	};
	let mut registry = match data.registry.lock() {
		Ok(r) => r,
		Err(_) => return HttpResponse::InternalServerError().body("Registry lock failed"),
	};
	registry.register(user, fields);
	HttpResponse::Ok().body(format!(
		"Success! You are now registered for the following proficiencies:\n{fields}"
	))
}

#[put("/v1/registry/unregister")]
async fn put_unregister(data: web::Data<SharedData>, query: web::Query<RegistryParams>) -> impl Responder {
	let (user, fields) = match (required(&query.user, "user"), required(&query.fields, "fields")) {
		(Ok(u), Ok(f)) => (u, f),
		(Err(response), _) | (_, Err(response)) => return response,
	};
	let mut registry = match data.registry.lock() {
		Ok(r) => r,
		Err(_) => return HttpResponse::InternalServerError().body("Registry lock failed"),
	};
	registry.unregister(user, fields);
	HttpResponse::Ok().body(format!(
		"Success! You are now unregistered from the following proficiencies:\n{fields}"
	))
}

#[get("/v1/registry/user")]
async fn get_user_proficiencies(data: web::Data<SharedData>, query: web::Query<RegistryParams>) -> impl Responder {
	let user = match required(&query.user, "user") {
		Ok(u) => u,
		Err(response) => return response,
	};
	let registry = match data.registry.lock() {
		Ok(r) => r,
		Err(_) => return HttpResponse::InternalServerError().body("Registry lock failed"),
	};
	HttpResponse::Ok().body(format!(
		"The user {user} is proficient in:\n{}",
		registry.proficiencies_of(user).join(", ")
	))
}

#[get("/v1/registry/help")]
async fn get_help(data: web::Data<SharedData>, query: web::Query<HelpQuery>) -> impl Responder {
	let field = match required(&query.field, "field") {
		Ok(f) => f,
		Err(response) => return response,
	};
	let registry = match data.registry.lock() {
		Ok(r) => r,
		Err(_) => return HttpResponse::InternalServerError().body("Registry lock failed"),
	};
	match registry.helpers_for(field) {
		Some(users) => HttpResponse::Ok().body(format!(
			"Automatically mentioning all people with a reported proficiency in *{field}*:\n{}",
			users.join(" ")
		)),
		None => HttpResponse::Ok().body(format!("Sorry, but nobody has reported a proficiency in *{field}*.")),
	}
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(post_learn)
		.service(get_stats)
		.service(get_spoiler)
		.service(get_formula)
		.service(put_register)
		.service(put_unregister)
		.service(get_user_proficiencies)
		.service(get_help)
		.service(get_help_text);
}

/// Main entry point for the server.
///
/// Rebuilds the model from the corpus, wraps it in a `RwLock`,
/// and starts an Actix-web HTTP server.
///
/// # Notes
/// - Configuration comes from `markov.toml` and `MARKOV_*` variables.
/// - A missing corpus starts an empty model.
#[actix_web::main]
async fn main() -> io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = Config::load().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
	let model = Model::from_corpus(&config.corpus_path, config.degree).map_err(io::Error::other)?;
	let stats = model.stats();
	info!(
		"model ready: degree {}, {} nodes, {} words from {}",
		stats.degree,
		stats.nodes,
		stats.vocabulary,
		config.corpus_path.display()
	);

	let shared_data = web::Data::new(SharedData::new(model, config.corpus_path.clone()));

	info!("listening on {}:{}", config.host, config.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(routes)
	})
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;
	use rs_markov_core::model::token::Token;

	fn shared(degree: usize, dir: &tempfile::TempDir) -> web::Data<SharedData> {
		let model = Model::new(degree).unwrap();
		web::Data::new(SharedData::new(model, dir.path().join("markov.txt")))
	}

	#[actix_web::test]
	async fn learn_persists_then_generates() {
		let dir = tempfile::tempdir().unwrap();
		let data = shared(2, &dir);
		let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, "");

		let req = test::TestRequest::post()
			.uri("/v1/learn?reply=true")
			.set_payload("hello big world\n\nhello big world")
			.to_request();
		let reply = test::call_and_read_body(&app, req).await;
		assert_eq!(reply, "hello big world");

		let corpus = std::fs::read_to_string(dir.path().join("markov.txt")).unwrap();
		assert_eq!(corpus, "hello big world\nhello big world\n");

		// Restarting from the corpus rebuilds the same model.
		let reloaded = Model::from_corpus(dir.path().join("markov.txt"), 2).unwrap();
		assert_eq!(reloaded.stats(), data.model.read().unwrap().stats());
	}

	#[actix_web::test]
	async fn trailing_carriage_returns_survive_a_restart() {
		let dir = tempfile::tempdir().unwrap();
		let data = shared(1, &dir);
		let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;

		let req = test::TestRequest::post().uri("/v1/learn").set_payload("hi there\r").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let reloaded = Model::from_corpus(dir.path().join("markov.txt"), 1).unwrap();
		let guard = data.model.read().unwrap();
		let live: &Model = &guard;
		let hi = Token::Word("hi".to_owned());
		let words = |m: &Model| -> Vec<Token> {
			m.root().child(&hi).unwrap().children().map(|(t, _)| t.clone()).collect()
		};
		assert_eq!(words(live), vec![Token::Word("there".to_owned())]);
		assert_eq!(words(live), words(&reloaded));
		assert_eq!(live.stats(), reloaded.stats());
	}

	#[actix_web::test]
	async fn help_lists_every_route() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(2, &dir)).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/help").to_request();
		let body = test::call_and_read_body(&app, req).await;
		let body = std::str::from_utf8(&body).unwrap();
		for route in ["/v1/generate", "/v1/learn", "/v1/stats", "/v1/formula", "/v1/registry/help"] {
			assert!(body.contains(route), "{route} missing from help");
		}
	}

	#[actix_web::test]
	async fn stats_are_json() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(3, &dir)).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/stats").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, r#"{"degree":3,"nodes":1,"vocabulary":0}"#);
	}

	#[actix_web::test]
	async fn registry_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(2, &dir)).configure(routes)).await;

		let req = test::TestRequest::put()
			.uri("/v1/registry/register?user=%40ann&fields=Rust,%20Topology")
			.to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = test::TestRequest::get().uri("/v1/registry/user?user=%40ann").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "The user @ann is proficient in:\nrust, topology");

		let req = test::TestRequest::get().uri("/v1/registry/help?field=RUST").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "Automatically mentioning all people with a reported proficiency in *RUST*:\n@ann");

		let req = test::TestRequest::get().uri("/v1/registry/help?field=cooking").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "Sorry, but nobody has reported a proficiency in *cooking*.");
	}

	#[actix_web::test]
	async fn missing_parameters_are_bad_requests() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(2, &dir)).configure(routes)).await;

		let req = test::TestRequest::put().uri("/v1/registry/register?user=%40ann").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::get().uri("/v1/formula").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn formulas_become_urls() {
		let dir = tempfile::tempdir().unwrap();
		let app = test::init_service(App::new().app_data(shared(2, &dir)).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/formula?text=see%20%24x%2By%24%20here").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "http://chart.apis.google.com/chart?cht=tx&chl=x%2By");
	}
}
