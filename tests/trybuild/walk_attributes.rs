use std::collections::HashMap;

use confwalk::Walk;

#[derive(Walk, Default)]
struct Common {
    pub verbose: bool,
}

#[derive(Walk, Default)]
struct App {
    #[walk(rename = "Name", tag = r#"env:"APP_NAME""#)]
    pub name: String,
    #[walk(embed)]
    pub common: Common,
    #[walk(skip)]
    pub scratch: HashMap<String, Vec<u8>>,
    pub r#type: u8,
}

fn main() {
    let app = App::default();
    assert_eq!(app.size(), 3);

    let fields = app.fields();
    assert_eq!(fields[0].name(), "Name");
    assert_eq!(fields[0].tag().get("env"), "APP_NAME");
    assert!(fields[1].is_embedded());
    assert_eq!(fields[2].name(), "type");

    let mut crawler = confwalk::Crawler::new(&app);
    assert!(crawler.enter("verbose"));
    assert_eq!(crawler.path(), "common/verbose");
    assert!(app.scratch.is_empty());
}
