//! Tab-strip example - wrapping nodes, toggling state and watching mutations

use query::{node, ready, Document, DocumentConfig, Event};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config: DocumentConfig = serde_json::from_str(r#"{ "viewport_width": 800 }"#)?;
    let doc = Document::parse_html_with_config(
        r##"<html><body>
            <nav>
                <a class="tab" href="#one">One</a>
                <a class="tab" href="#two">Two</a>
            </nav>
            <section id="panel" style="display: block">Panel</section>
        </body></html>"##,
        config,
    )?;

    // Print every mutation record as JSON
    let mut feed = doc.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = feed.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => println!("mutation: {}", json),
                Err(e) => eprintln!("unserializable mutation: {}", e),
            }
        }
    });

    ready(&doc, |_| println!("Window loaded"))?;

    let tabs = node(&doc, ".tab");
    tabs.listen("click", |event| {
        println!("Clicked node {}", event.target());
    })?;
    tabs.active(false)?;
    node(&doc, tabs.first()?).active(true)?;
    doc.dispatch_event(tabs.first()?, Event::bubbling("click"))?;

    let panel = node(&doc, "#panel");
    panel.hide()?;
    println!("Panel display after hide: {:?}", panel.css("display")?);
    panel.show()?;
    println!("Panel display after show: {:?}", panel.css("display")?);
    println!("Viewport width: {}", node(&doc, doc.window()).width()?);

    doc.finish_loading()?;

    drop(doc);
    drop(tabs);
    drop(panel);
    printer.await?;

    Ok(())
}
