//! HTTP calls to the routing backend.
//!
//! Each call resolves to a `Msg` so it can be handed straight to
//! `orders.perform_cmd`. Failures are folded into `Err(String)`; the update
//! loop decides per feed how a failure degrades (retry message for routes,
//! silently absent panels for alerts and news).

use seed::prelude::*;
use shared::{NewsArticle, Route, RouteQuery, TrafficAlert, TrafficSample};

use crate::Msg;

fn api_root() -> String {
    if let Some(url) = option_env!("FRONTEND_API_ROOT") {
        return url.trim_end_matches('/').to_string();
    }
    "http://localhost:8000/api".to_string()
}

pub async fn fetch_routes(query: RouteQuery) -> Msg {
    Msg::RoutesFetched(post_routes(query).await)
}

async fn post_routes(query: RouteQuery) -> Result<Vec<Route>, String> {
    let request = Request::new(format!("{}/routes", api_root()))
        .method(Method::Post)
        .json(&query)
        .map_err(|err| format!("{err:?}"))?;
    let response = request.fetch().await.map_err(|err| format!("{err:?}"))?;
    let response = response.check_status().map_err(|err| format!("{err:?}"))?;
    response
        .json::<Vec<Route>>()
        .await
        .map_err(|err| format!("{err:?}"))
}

pub async fn fetch_alerts() -> Msg {
    Msg::AlertsFetched(get_json::<Vec<TrafficAlert>>(format!("{}/alerts", api_root())).await)
}

pub async fn fetch_traffic(label: String) -> Msg {
    let url = format!("{}/traffic?label={label}", api_root());
    Msg::TrafficFetched(get_json::<Vec<TrafficSample>>(url).await)
}

pub async fn fetch_news() -> Msg {
    Msg::NewsFetched(get_json::<Vec<NewsArticle>>(format!("{}/traffic-news", api_root())).await)
}

async fn get_json<T: serde::de::DeserializeOwned + 'static>(url: String) -> Result<T, String> {
    let response = Request::new(url)
        .method(Method::Get)
        .fetch()
        .await
        .map_err(|err| format!("{err:?}"))?;
    let response = response.check_status().map_err(|err| format!("{err:?}"))?;
    response.json::<T>().await.map_err(|err| format!("{err:?}"))
}
