mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sento::{Context, Flow, RouteOptions, Router};

use common::text;

async fn name(ctx: Context) -> String {
    ctx.param("name").unwrap_or_default().to_owned()
}

async fn cat_for_fubuki(ctx: Context) -> Option<&'static str> {
    (ctx.param("name") == Some("Fubuki")).then_some("Cat")
}

async fn dog_for_korone(ctx: Context) -> Option<&'static str> {
    (ctx.param("name") == Some("Korone")).then_some("Dog")
}

#[tokio::test]
async fn binds_path_parameter() {
    let app = Router::new().get("/name/:name", name).build();
    assert_eq!(text(&app, "/name/Fubuki").await, "Fubuki");
}

#[tokio::test]
async fn global_pre_handler_skips_main_handler() {
    let app = Router::new()
        .pre_handler(cat_for_fubuki)
        .get("/name/:name", name)
        .build();

    assert_eq!(text(&app, "/name/Fubuki").await, "Cat");
    assert_eq!(text(&app, "/name/Watame").await, "Watame");
}

#[tokio::test]
async fn local_pre_handler_skips_main_handler() {
    let app = Router::new()
        .get_with("/name/:name", name, RouteOptions::new().pre_handler(cat_for_fubuki))
        .build();

    assert_eq!(text(&app, "/name/Fubuki").await, "Cat");
}

#[tokio::test]
async fn pre_handler_registered_after_route_has_no_effect() {
    let app = Router::new()
        .get("/name/:name", name)
        .pre_handler(cat_for_fubuki)
        .build();

    assert_eq!(text(&app, "/name/Fubuki").await, "Fubuki");
}

#[tokio::test]
async fn global_and_local_pre_handlers_combine() {
    let app = Router::new()
        .pre_handler(cat_for_fubuki)
        .get_with("/name/:name", name, RouteOptions::new().pre_handler(dog_for_korone))
        .build();

    assert_eq!(text(&app, "/name/Fubuki").await, "Cat");
    assert_eq!(text(&app, "/name/Korone").await, "Dog");
    assert_eq!(text(&app, "/name/Watame").await, "Watame");
}

#[tokio::test]
async fn multiple_pre_handlers_run_in_order() {
    let app = Router::new()
        .pre_handler(cat_for_fubuki)
        .pre_handler(dog_for_korone)
        .get("/name/:name", name)
        .build();

    assert_eq!(text(&app, "/name/Fubuki").await, "Cat");
    assert_eq!(text(&app, "/name/Korone").await, "Dog");
}

#[tokio::test]
async fn first_short_circuit_wins_and_stops_the_chain() {
    let later_calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = Arc::new(AtomicUsize::new(0));

    let later = Arc::clone(&later_calls);
    let handled = Arc::clone(&handler_calls);
    let app = Router::new()
        .pre_handler(|_: Context| async { Some("first") })
        .pre_handler(move |_: Context| {
            later.fetch_add(1, Ordering::SeqCst);
            async { Some("second") }
        })
        .get("/", move |_: Context| {
            handled.fetch_add(1, Ordering::SeqCst);
            async { "main" }
        })
        .build();

    assert_eq!(text(&app, "/").await, "first");
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn local_pre_handler_runs_after_inherited_ones() {
    let order = Arc::new(Mutex::new(Vec::new()));

    let record = |label: &'static str| {
        let order = Arc::clone(&order);
        move |_: Context| {
            order.lock().unwrap().push(label);
            async {}
        }
    };

    let app = Router::new()
        .pre_handler(record("global"))
        .group("/type", |r| {
            r.pre_handler(record("group"))
                .get_with("/name", name, RouteOptions::new().pre_handler(record("local")))
        })
        .build();

    text(&app, "/type/name").await;
    assert_eq!(*order.lock().unwrap(), ["global", "group", "local"]);
}

#[tokio::test]
async fn async_pre_handler_is_awaited_before_anything_else() {
    let app = Router::new()
        .get_with(
            "/name/:name",
            name,
            RouteOptions::new().pre_handler(|ctx: Context| async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                (ctx.param("name") == Some("Watame")).then_some("Warukunai yo ne")
            }),
        )
        .build();

    assert_eq!(text(&app, "/name/Watame").await, "Warukunai yo ne");
    assert_eq!(text(&app, "/name/Fubuki").await, "Fubuki");
}

#[tokio::test]
async fn slow_pre_handler_finishes_before_main_handler_starts() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let pre_log = Arc::clone(&log);
    let main_log = Arc::clone(&log);
    let app = Router::new()
        .pre_handler(move |_: Context| {
            let log = Arc::clone(&pre_log);
            async move {
                log.lock().unwrap().push("pre: start");
                tokio::time::sleep(Duration::from_millis(20)).await;
                log.lock().unwrap().push("pre: end");
            }
        })
        .get("/", move |_: Context| {
            let log = Arc::clone(&main_log);
            async move {
                log.lock().unwrap().push("main");
                "done"
            }
        })
        .build();

    assert_eq!(text(&app, "/").await, "done");
    assert_eq!(*log.lock().unwrap(), ["pre: start", "pre: end", "main"]);
}

#[tokio::test]
async fn explicit_flow_values() {
    let app = Router::new()
        .pre_handler(|ctx: Context| async move {
            if ctx.query("block").is_some() {
                Flow::ShortCircuit("blocked")
            } else {
                Flow::Continue
            }
        })
        .get("/", |_: Context| async { "open" })
        .build();

    assert_eq!(text(&app, "/").await, "open");
    assert_eq!(text(&app, "/?block=1").await, "blocked");
}

#[tokio::test]
async fn pre_handler_state_reaches_main_handler() {
    #[derive(Clone)]
    struct User(String);

    let app = Router::new()
        .pre_handler(|ctx: Context| async move {
            if let Some(user) = ctx.header("x-user") {
                ctx.insert(User(user.to_owned()));
            }
        })
        .get("/me", |ctx: Context| async move {
            ctx.get::<User>().map_or_else(|| "anonymous".to_owned(), |u| u.0)
        })
        .build();

    common::init_tracing();
    let req = sento::http::Request::get("/me").header("x-user", "Korone").body("").unwrap();
    assert_eq!(app.handle(req).await.unwrap().text_body(), "Korone");
    assert_eq!(text(&app, "/me").await, "anonymous");
}
