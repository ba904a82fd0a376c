// src/main.rs
use bioschemas_showcase::components::showcase::{Showcase, ShowcaseProps};
use bioschemas_showcase::utils::{showcase_hosts, SHOWCASE_TAG};

fn main() {
    wasm_logger::init(wasm_logger::Config::default());

    let hosts = showcase_hosts();
    if hosts.is_empty() {
        log::warn!("No <{}> element found in the page", SHOWCASE_TAG);
        return;
    }

    log::info!("Mounting {} showcase instance(s)", hosts.len());
    for host in hosts {
        yew::Renderer::<Showcase>::with_root_and_props(host.clone(), ShowcaseProps { host })
            .render();
    }
}
