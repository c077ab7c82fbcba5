use seed::{prelude::*, virtual_dom::AtValue, *};
use serde::Deserialize;
use shared::{NewsArticle, Route, RouteQuery, TrafficAlert, TrafficSample};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast};

pub mod api;
pub mod chart;
pub mod features;
pub mod map;
pub mod route_view;

use chart::{ChartPanel, TrafficChart};
use map::MapSession;
use route_view::RouteSet;

const ALERT_POLL_MS: u32 = 60_000;

/// Label of the monitored area whose history backs the traffic chart.
const TRAFFIC_LABEL: &str = "city-center";

pub struct Model {
    form: RouteForm,
    query_pending: bool,
    searched: bool,
    routes: RouteSet,
    error: Option<String>,
    alerts: Vec<TrafficAlert>,
    traffic: Vec<TrafficSample>,
    news: NewsState,
    active_tab: Tab,
    map: MapSession,
    chart: ChartPanel,
    // Keeps the 60s alert poll alive; dropping the model cancels the timer.
    _alert_poll: StreamHandle,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tab {
    Planner,
    News,
}

#[derive(Debug, PartialEq)]
enum NewsState {
    NotRequested,
    Loading,
    Loaded(Vec<NewsArticle>),
}

#[derive(Default, Clone)]
struct RouteForm {
    origin: String,
    destination: String,
    departure: String,
    avoid_tolls: bool,
    avoid_highways: bool,
}

/// When to leave, as entered in the form. Anything unparsable is a form
/// error; an empty field means "leave now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Departure {
    Now,
    At { hours: u32, minutes: u32 },
}

fn parse_departure(raw: &str) -> Result<Departure, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Departure::Now);
    }
    let invalid = || format!("Departure time must be HH:MM, got \"{trimmed}\"");
    let (hours, minutes) = trimmed.split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(Departure::At { hours, minutes })
}

/// Wire value for `departure_time`: `"now"`, or today at the given clock
/// time as unix seconds.
fn departure_param(departure: Departure) -> String {
    match departure {
        Departure::Now => "now".to_string(),
        Departure::At { hours, minutes } => {
            let date = js_sys::Date::new_0();
            date.set_hours(hours);
            date.set_minutes(minutes);
            date.set_seconds(0);
            date.set_milliseconds(0);
            format!("{}", (date.get_time() / 1000.0) as i64)
        }
    }
}

impl RouteForm {
    fn to_query(&self) -> Result<RouteQuery, String> {
        let origin = self.origin.trim();
        let destination = self.destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err("Enter both an origin and a destination".to_string());
        }
        let departure = parse_departure(&self.departure)?;
        Ok(RouteQuery {
            origin: origin.to_string(),
            destination: destination.to_string(),
            avoid_tolls: self.avoid_tolls,
            avoid_highways: self.avoid_highways,
            departure_time: departure_param(departure),
        })
    }
}

pub enum Msg {
    OriginChanged(String),
    DestinationChanged(String),
    DepartureChanged(String),
    AvoidTollsToggled,
    AvoidHighwaysToggled,
    Submit,
    RoutesFetched(Result<Vec<Route>, String>),
    RouteSelected(usize),
    ExpandOverview,
    TabChanged(Tab),
    AlertsTick,
    AlertsFetched(Result<Vec<TrafficAlert>, String>),
    TrafficFetched(Result<Vec<TrafficSample>, String>),
    ChartRedraw,
    NewsFetched(Result<Vec<NewsArticle>, String>),
}

#[derive(Deserialize)]
struct RouteClickPayload {
    #[serde(rename = "routeIndex")]
    route_index: usize,
}

pub fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    // Map feature clicks arrive from the bridge as window CustomEvents. An
    // unreadable payload maps to an out-of-range index, which selection
    // rejects.
    orders.stream(streams::window_event(Ev::from("route-select"), |event| {
        let event = event
            .dyn_into::<web_sys::CustomEvent>()
            .expect("route-select event must be CustomEvent");
        let payload: RouteClickPayload = serde_wasm_bindgen::from_value(event.detail())
            .unwrap_or(RouteClickPayload {
                route_index: usize::MAX,
            });
        Msg::RouteSelected(payload.route_index)
    }));

    let alert_poll =
        orders.stream_with_handle(streams::interval(ALERT_POLL_MS, || Msg::AlertsTick));
    orders.perform_cmd(api::fetch_alerts());

    Model {
        form: RouteForm::default(),
        query_pending: false,
        searched: false,
        routes: RouteSet::default(),
        error: None,
        alerts: Vec::new(),
        traffic: Vec::new(),
        news: NewsState::NotRequested,
        active_tab: Tab::Planner,
        map: MapSession::mount(),
        chart: ChartPanel::mount(),
        _alert_poll: alert_poll,
    }
}

pub fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::OriginChanged(value) => model.form.origin = value,
        Msg::DestinationChanged(value) => model.form.destination = value,
        Msg::DepartureChanged(value) => model.form.departure = value,
        Msg::AvoidTollsToggled => model.form.avoid_tolls = !model.form.avoid_tolls,
        Msg::AvoidHighwaysToggled => model.form.avoid_highways = !model.form.avoid_highways,
        Msg::Submit => {
            // One request at a time; results of a search always land before
            // the next one can start.
            if model.query_pending {
                return;
            }
            match model.form.to_query() {
                Ok(query) => {
                    model.query_pending = true;
                    model.error = None;
                    orders.perform_cmd(api::fetch_routes(query));
                }
                Err(err) => model.error = Some(err),
            }
        }
        Msg::RoutesFetched(result) => {
            model.query_pending = false;
            model.searched = true;
            model.traffic.clear();
            model.chart.destroy();
            match result {
                Ok(routes) => {
                    web_sys::console::debug_1(
                        &format!("[planner] received {} candidate routes", routes.len()).into(),
                    );
                    model.routes.replace(routes);
                    model.error = None;
                    draw_overview(model);
                }
                Err(err) => {
                    web_sys::console::error_1(&format!("route request failed: {err}").into());
                    model.routes.replace(Vec::new());
                    model.error =
                        Some("Failed to fetch routes. Please try again later.".to_string());
                    model.map.clear();
                }
            }
        }
        Msg::RouteSelected(index) => {
            if model.routes.select(index) {
                if let Some((index, route)) = model.routes.selected() {
                    model.map.render(&features::detail_features(route, index));
                }
                model.traffic.clear();
                orders.perform_cmd(api::fetch_traffic(TRAFFIC_LABEL.to_string()));
            }
        }
        Msg::ExpandOverview => {
            model.routes.expand();
            model.traffic.clear();
            model.chart.destroy();
            draw_overview(model);
        }
        Msg::TabChanged(tab) => {
            model.active_tab = tab;
            model.map.set_visible(tab == Tab::Planner);
            if tab == Tab::News && model.news == NewsState::NotRequested {
                model.news = NewsState::Loading;
                orders.perform_cmd(api::fetch_news());
            }
        }
        Msg::AlertsTick => {
            orders.perform_cmd(api::fetch_alerts());
        }
        Msg::AlertsFetched(result) => {
            // An unreachable alert feed means no banner, never a broken
            // planner.
            model.alerts = result.unwrap_or_default();
        }
        Msg::TrafficFetched(result) => match result {
            Ok(samples) => {
                model.traffic = samples;
                if model.routes.selected().is_some() && !model.traffic.is_empty() {
                    orders.after_next_render(|_| Msg::ChartRedraw);
                }
            }
            Err(err) => {
                web_sys::console::debug_1(&format!("traffic series unavailable: {err}").into());
                model.traffic.clear();
                model.chart.destroy();
            }
        },
        Msg::ChartRedraw => {
            if let Some((index, _)) = model.routes.selected() {
                if !model.traffic.is_empty() {
                    let series = TrafficChart::build(&features::route_name(index), &model.traffic);
                    model.chart.render(&series);
                }
            }
        }
        Msg::NewsFetched(result) => {
            model.news = NewsState::Loaded(result.unwrap_or_default());
        }
    }
}

/// Redraws the all-candidates view: every route color-coded and clickable,
/// viewport fitted to the first route, endpoint markers at its ends.
fn draw_overview(model: &Model) {
    if model.routes.is_empty() {
        model.map.clear();
        return;
    }
    model
        .map
        .render(&features::overview_features(model.routes.routes()));
    if let Some(bounds) = features::first_route_bounds(model.routes.routes()) {
        model.map.fit(bounds);
    }
    if let Some((start, end)) = model
        .routes
        .routes()
        .first()
        .and_then(features::route_endpoints)
    {
        model.map.set_endpoints(start, end);
    }
}

pub fn view(model: &Model) -> Node<Msg> {
    div![
        C!["app-container"],
        view_navbar(model.active_tab),
        view_alerts(model),
        match model.active_tab {
            Tab::Planner => view_planner(model),
            Tab::News => view_news(&model.news),
        }
    ]
}

fn view_navbar(active: Tab) -> Node<Msg> {
    let tab_button = |label: &str, tab: Tab| {
        button![
            C!["nav-tab", IF!(active == tab => "active")],
            label,
            ev(Ev::Click, move |_| Msg::TabChanged(tab)),
        ]
    };

    nav![
        C!["navbar"],
        div![C!["navbar-title"], "Traffic Advisor"],
        div![
            C!["navbar-tabs"],
            tab_button("Best Time", Tab::Planner),
            tab_button("Traffic News", Tab::News),
        ],
    ]
}

fn view_alerts(model: &Model) -> Node<Msg> {
    if model.active_tab != Tab::Planner || model.alerts.is_empty() {
        return empty![];
    }
    div![
        C!["alerts-panel"],
        strong!["Real-Time Alerts:"],
        ul![model.alerts.iter().map(|alert| {
            li![b![format!("{}: ", alert.kind)], &alert.description]
        })],
    ]
}

fn view_planner(model: &Model) -> Node<Msg> {
    let form_panel = if model.routes.selected().is_some() {
        button![
            C!["expand-form"],
            "+",
            attrs! { At::Title => "Back to route search" },
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::ExpandOverview
            }),
        ]
    } else {
        view_form(model)
    };

    div![C!["planner"], form_panel, view_results(model)]
}

fn view_form(model: &Model) -> Node<Msg> {
    let text_field = |label: &str, value: &str, placeholder: &str, msg: fn(String) -> Msg| {
        div![
            C!["input-field"],
            label![label],
            input![
                attrs! {
                    At::Value => value,
                    At::Placeholder => placeholder,
                    At::AutoComplete => "off",
                    At::SpellCheck => "false",
                },
                input_ev(Ev::Input, msg),
            ]
        ]
    };
    let check_field = |label: &str, checked: bool, msg: fn() -> Msg| {
        label![
            C!["check-field"],
            input![
                attrs! {
                    At::Type => "checkbox",
                    At::Checked => bool_attr(checked),
                },
                ev(Ev::Change, move |_| msg()),
            ],
            span![label],
        ]
    };

    form![
        C!["controls"],
        fieldset![
            legend!["Trip"],
            text_field(
                "Origin",
                &model.form.origin,
                "e.g. MG Road",
                Msg::OriginChanged
            ),
            text_field(
                "Destination",
                &model.form.destination,
                "e.g. Airport",
                Msg::DestinationChanged
            ),
            text_field(
                "Departure time",
                &model.form.departure,
                "HH:MM, empty = now",
                Msg::DepartureChanged
            ),
        ],
        fieldset![
            legend!["Avoid"],
            check_field("Tolls", model.form.avoid_tolls, || Msg::AvoidTollsToggled),
            check_field("Highways", model.form.avoid_highways, || {
                Msg::AvoidHighwaysToggled
            }),
        ],
        button![
            if model.query_pending {
                "Searching..."
            } else {
                "Find routes"
            },
            attrs! { At::Disabled => bool_attr(model.query_pending) },
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::Submit
            }),
        ],
        if let Some(error) = &model.error {
            p![C!["error"], error]
        } else {
            empty![]
        }
    ]
}

fn view_results(model: &Model) -> Node<Msg> {
    if !model.searched || model.query_pending {
        return empty![];
    }
    if model.routes.is_empty() {
        return if model.error.is_none() {
            div![C!["empty-state"], "No routes found for this trip."]
        } else {
            empty![]
        };
    }

    let selected = model.routes.selected().map(|(index, _)| index);
    let cards = model
        .routes
        .routes()
        .iter()
        .enumerate()
        .map(|(index, route)| {
            div![
                C![
                    "route-item",
                    IF!(selected == Some(index) => "selected"),
                    IF!(route.is_optimal => "optimal-route"),
                ],
                h4![
                    features::route_name(index),
                    IF!(route.is_optimal => span![C!["badge"], " (Recommended)"]),
                ],
                p![format!("Distance: {}", route.distance)],
                p![format!("Duration: {}", route.duration)],
                p![format!("Real-Time: {}", route.duration_in_traffic)],
                p![format!("ETA: {}", display_or_na(&route.eta))],
                ev(Ev::Click, move |_| Msg::RouteSelected(index)),
            ]
        });

    div![
        C!["routes-container"],
        h3!["Available Routes"],
        div![C!["routes-list"], cards],
        match model.routes.selected() {
            None => view_comparison_table(model.routes.routes()),
            Some((index, route)) => view_route_detail(model, index, route),
        },
    ]
}

fn view_comparison_table(routes: &[Route]) -> Node<Msg> {
    table![
        C!["route-comparison-table"],
        thead![tr![
            th!["Route"],
            th!["Distance"],
            th!["Duration"],
            th!["Real-Time"],
            th!["ETA"],
            th!["Tolls"],
            th!["Highways"],
            th!["Recommended"],
        ]],
        tbody![routes.iter().enumerate().map(|(index, route)| {
            tr![
                td![(index + 1).to_string()],
                td![&route.distance],
                td![&route.duration],
                td![&route.duration_in_traffic],
                td![display_or_na(&route.eta)],
                td![allowed_label(route.avoid_tolls)],
                td![allowed_label(route.avoid_highways)],
                td![if route.is_optimal { "✓" } else { "" }],
            ]
        })],
    ]
}

fn view_route_detail(model: &Model, index: usize, route: &Route) -> Node<Msg> {
    div![
        C!["route-detail"],
        button![
            C!["expand-btn"],
            "← All routes",
            ev(Ev::Click, |_| Msg::ExpandOverview),
        ],
        h4![format!("{} Details", features::route_name(index))],
        p![strong!["Distance: "], &route.distance],
        p![strong!["Duration: "], &route.duration],
        p![strong!["Real-Time: "], &route.duration_in_traffic],
        p![strong!["ETA: "], display_or_na(&route.eta)],
        p![strong!["Start: "], display_or_na(&route.start_location)],
        p![strong!["End: "], display_or_na(&route.end_location)],
        div![
            strong!["Steps:"],
            if route.steps.is_empty() {
                p![C!["muted"], "No turn-by-turn steps for this route."]
            } else {
                ol![route.steps.iter().map(|step| li![plain_instruction(step)])]
            }
        ],
        view_traffic_section(model),
    ]
}

fn view_traffic_section(model: &Model) -> Node<Msg> {
    if !model.chart.is_available() {
        return empty![];
    }
    if model.traffic.is_empty() {
        return p![C!["muted"], "No traffic history for this route yet."];
    }

    div![
        C!["traffic-graph-container"],
        canvas![attrs! { At::Id => "traffic-chart" }],
        if let Some(best) = chart::best_window(&model.traffic) {
            div![
                C!["traffic-summary"],
                h3!["Best Time to Travel"],
                p![
                    "The best time to take this route is around ",
                    b![&best.time],
                    format!(" with {:.0}% traffic", best.traffic_level),
                ],
            ]
        } else {
            empty![]
        }
    ]
}

fn view_news(news: &NewsState) -> Node<Msg> {
    let body = match news {
        NewsState::NotRequested | NewsState::Loading => div![C!["muted"], "Loading..."],
        NewsState::Loaded(items) if items.is_empty() => div![C!["muted"], "No news found."],
        NewsState::Loaded(items) => ul![items.iter().map(|item| {
            li![
                a![
                    attrs! {
                        At::Href => item.url.as_str(),
                        At::Target => "_blank",
                        At::Rel => "noopener noreferrer",
                    },
                    strong![&item.title],
                ],
                div![&item.description],
                small![C!["muted"], &item.published_at],
            ]
        })],
    };

    div![C!["traffic-news"], h3!["Live Traffic News & Incidents"], body]
}

#[wasm_bindgen(start)]
pub fn start() {
    App::start("app", init, update, view);
}

fn bool_attr(value: bool) -> AtValue {
    if value {
        AtValue::Some("true".into())
    } else {
        AtValue::Ignored
    }
}

fn display_or_na(value: &str) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

fn allowed_label(avoided: bool) -> &'static str {
    if avoided {
        "No"
    } else {
        "Yes"
    }
}

/// Step instructions arrive as HTML fragments; the side panel renders them
/// as plain text.
fn plain_instruction(step: &str) -> String {
    let mut out = String::with_capacity(step.len());
    let mut in_tag = false;
    for ch in step.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ").replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_requires_origin_and_destination() {
        let form = RouteForm {
            origin: "  ".to_string(),
            destination: "Airport".to_string(),
            ..RouteForm::default()
        };
        assert!(form.to_query().is_err());
    }

    #[test]
    fn form_builds_query_with_now_departure() {
        let form = RouteForm {
            origin: " MG Road ".to_string(),
            destination: "Airport".to_string(),
            avoid_tolls: true,
            ..RouteForm::default()
        };

        let query = form.to_query().expect("valid form");
        assert_eq!(query.origin, "MG Road");
        assert_eq!(query.destination, "Airport");
        assert!(query.avoid_tolls);
        assert!(!query.avoid_highways);
        assert_eq!(query.departure_time, "now");
    }

    #[test]
    fn departure_parses_clock_times() {
        assert_eq!(parse_departure(""), Ok(Departure::Now));
        assert_eq!(
            parse_departure(" 08:30 "),
            Ok(Departure::At {
                hours: 8,
                minutes: 30
            })
        );
        assert!(parse_departure("25:00").is_err());
        assert!(parse_departure("08:61").is_err());
        assert!(parse_departure("soon").is_err());
    }

    #[test]
    fn invalid_departure_fails_the_whole_form() {
        let form = RouteForm {
            origin: "A".to_string(),
            destination: "B".to_string(),
            departure: "later".to_string(),
            ..RouteForm::default()
        };
        assert!(form.to_query().is_err());
    }

    #[test]
    fn instructions_are_stripped_to_plain_text() {
        assert_eq!(
            plain_instruction("Turn <b>left</b> onto <div style=\"x\">Main St</div>"),
            "Turn left onto Main St"
        );
        assert_eq!(plain_instruction("Head&nbsp;north"), "Head north");
        assert_eq!(plain_instruction("no markup"), "no markup");
    }

    #[test]
    fn empty_display_fields_render_as_na() {
        assert_eq!(display_or_na(""), "N/A");
        assert_eq!(display_or_na("12:45"), "12:45");
    }
}
