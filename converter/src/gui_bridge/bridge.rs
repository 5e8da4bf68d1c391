use crate::generator::profile::{generate_dive, DiveConfig};
use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::runner::Runner;
use log::{error, info, warn};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    thread,
};
use tokio::runtime::Builder;
use trackcore::prelude::TelemetryRecord;
use warp::{http::StatusCode, Filter};

pub fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

type SharedModel = Arc<RwLock<VisualizationModel>>;

fn read_model(state: &SharedModel) -> RwLockReadGuard<'_, VisualizationModel> {
    state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_model(state: &SharedModel) -> RwLockWriteGuard<'_, VisualizationModel> {
    state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// `GET /payload`, `POST /ingest` and `POST /ingest-config` over one shared model.
fn routes(
    state: SharedModel,
    runner: Arc<Runner>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());
    let runner_filter = warp::any().map(move || runner.clone());

    let get_route = warp::path("payload")
        .and(warp::get())
        .and(state_filter.clone())
        .map(|state: SharedModel| {
            let model = read_model(&state).clone();
            warp::reply::json(&model)
        });

    let post_route = warp::path("ingest")
        .and(warp::post())
        .and(warp::body::json())
        .and(state_filter.clone())
        .and(runner_filter.clone())
        .and_then(
            |records: Vec<TelemetryRecord>, state: SharedModel, runner: Arc<Runner>| async move {
                match runner.execute(&records) {
                    Ok(result) => {
                        *write_model(&state) = VisualizationModel::from_result(&result);
                        info!("ingested {} telemetry records", result.records.len());
                        Ok::<_, warp::Rejection>(warp::reply::with_status(
                            warp::reply::json(&json!({
                                "status": "ok",
                                "records": result.records.len()
                            })),
                            StatusCode::OK,
                        ))
                    }
                    Err(err) => {
                        warn!("ingest error: {:#}", err);
                        Err(warp::reject::custom(WarpError))
                    }
                }
            },
        );

    let generator_route = warp::path("ingest-config")
        .and(warp::post())
        .and(warp::body::json())
        .and(state_filter)
        .and(runner_filter)
        .and_then(
            |config: DiveConfig, state: SharedModel, runner: Arc<Runner>| async move {
                match generate_dive(&config).and_then(|records| runner.execute(&records)) {
                    Ok(result) => {
                        *write_model(&state) = VisualizationModel::from_result(&result);
                        if let Some(description) = config.description.as_ref() {
                            println!(
                                "[GUI] Dive {} -> {} records",
                                description,
                                result.records.len()
                            );
                        }
                        Ok::<_, warp::Rejection>(warp::reply::with_status(
                            warp::reply::json(&json!({
                                "status": "ok",
                                "records": result.records.len(),
                                "description": config.description.clone().unwrap_or_default()
                            })),
                            StatusCode::OK,
                        ))
                    }
                    Err(err) => {
                        warn!("ingest-config error: {:#}", err);
                        Err(warp::reject::custom(WarpError))
                    }
                }
            },
        );

    get_route.or(post_route).or(generator_route)
}

/// Bridge that hosts the scene HTTP endpoint and projects incoming batches.
pub struct GuiBridge {
    state: SharedModel,
}

impl GuiBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(VisualizationModel::default())),
        }
    }

    /// Starts the HTTP endpoint on its own thread and runtime.
    pub fn serve(&self, runner: Arc<Runner>, address: SocketAddr) {
        let routes = routes(self.state.clone(), runner);
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });
    }

    pub fn publish(&self, model: &VisualizationModel) {
        let mut guard = write_model(&self.state);
        *guard = model.clone();
        println!(
            "[GUI] scene points: {}, notes: {}",
            guard.record_count,
            guard.notes.len()
        );
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        read_model(&self.state).clone()
    }
}

impl Default for GuiBridge {
    fn default() -> Self {
        Self::new()
    }
}
