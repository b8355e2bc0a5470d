use relm4::prelude::*;
use vitrine::config;
use vitrine::gui::app::AppModel;
use vitrine::sys::runtime;

fn main() {
    env_logger::init();

    let config = config::load_or_default();

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx);

    let app = RelmApp::new("org.vitrine.vitrine");

    app.run::<AppModel>((config, rx));
}
