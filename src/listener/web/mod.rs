//! HTTP API exposing the lights as resources.
//!
//! | Method   | Path                        | Effect                     |
//! |----------|-----------------------------|----------------------------|
//! | `GET`    | `/lights`                   | list light names           |
//! | `GET`    | `/lights/:type`             | light status               |
//! | `PUT`    | `/lights/:type/on`          | turn on                    |
//! | `DELETE` | `/lights/:type/on`          | turn off                   |
//! | `PUT`    | `/lights/:type/transitions` | replace the animation      |
//!
//! Accepted requests answer 202: the light took the request, the hardware
//! may or may not have followed yet. Light operations run on the blocking
//! pool since they compile frames and join ticker threads.

use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{self, Reply, Response};
use warp::{Filter, Rejection};

use crate::compiler::Keyframe;
use crate::light::{Light, Status};
use crate::mapper::Mapper;

/// Largest accepted transitions body.
const MAX_BODY_BYTES: u64 = 256 * 1024;

#[derive(Serialize, Debug)]
struct LightStatus {
    #[serde(rename = "type")]
    light_type: String,
    #[serde(flatten)]
    status: Status,
}

#[derive(Serialize, Debug)]
struct ErrorBody {
    error: String,
}

pub fn routes(mapper: Arc<Mapper>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let list = warp::get()
        .and(warp::path!("lights"))
        .and(with_mapper(Arc::clone(&mapper)))
        .map(list_lights);

    let status = warp::get()
        .and(warp::path!("lights" / String))
        .and(with_mapper(Arc::clone(&mapper)))
        .map(get_status);

    let on = warp::put()
        .and(warp::path!("lights" / String / "on"))
        .and(with_mapper(Arc::clone(&mapper)))
        .then(|name: String, mapper: Arc<Mapper>| {
            blocking(move || with_light(&mapper, &name, |light| light.on()))
        });

    let off = warp::delete()
        .and(warp::path!("lights" / String / "on"))
        .and(with_mapper(Arc::clone(&mapper)))
        .then(|name: String, mapper: Arc<Mapper>| {
            blocking(move || with_light(&mapper, &name, |light| light.off()))
        });

    let transitions = warp::put()
        .and(warp::path!("lights" / String / "transitions"))
        .and(with_mapper(mapper))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .then(|name: String, mapper: Arc<Mapper>, body: Bytes| {
            blocking(move || put_transitions(name, mapper, body))
        });

    list.or(status)
        .unify()
        .or(on)
        .unify()
        .or(off)
        .unify()
        .or(transitions)
        .unify()
}

fn with_mapper(mapper: Arc<Mapper>) -> impl Filter<Extract = (Arc<Mapper>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&mapper))
}

async fn blocking<F>(action: F) -> Response
where
    F: FnOnce() -> Response + Send + 'static,
{
    match tokio::task::spawn_blocking(action).await {
        Ok(response) => response,
        Err(err) => {
            error!("light request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

fn accepted() -> Response {
    StatusCode::ACCEPTED.into_response()
}

fn bad_request(error: String) -> Response {
    reply::with_status(reply::json(&ErrorBody { error }), StatusCode::BAD_REQUEST).into_response()
}

fn list_lights(mapper: Arc<Mapper>) -> Response {
    reply::json(&mapper.names()).into_response()
}

fn get_status(name: String, mapper: Arc<Mapper>) -> Response {
    match mapper.get(&name) {
        Some(light) => reply::json(&LightStatus {
            status: light.status(),
            light_type: name,
        })
        .into_response(),
        None => not_found(),
    }
}

fn with_light<F: FnOnce(&Light)>(mapper: &Mapper, name: &str, action: F) -> Response {
    match mapper.get(name) {
        Some(light) => {
            action(light.as_ref());
            accepted()
        }
        None => not_found(),
    }
}

fn put_transitions(name: String, mapper: Arc<Mapper>, body: Bytes) -> Response {
    let light = match mapper.get(&name) {
        Some(light) => light,
        None => return not_found(),
    };

    let keyframes: Vec<Keyframe> = match serde_json::from_slice(&body) {
        Ok(keyframes) => keyframes,
        Err(err) => {
            warn!(light = %name, "rejected transitions: {}", err);
            return bad_request(err.to_string());
        }
    };

    match light.transitions(&keyframes) {
        Ok(()) => accepted(),
        Err(err) => {
            warn!(light = %name, "rejected transitions: {}", err);
            bad_request(err.to_string())
        }
    }
}
