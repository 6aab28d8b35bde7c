use confwalk::walk::Shape;
use confwalk::Walk;

#[derive(Walk)]
struct Server {
    pub host: String,
    pub port: u16,
    limit: u32,
}

fn main() {
    let server = Server {
        host: "localhost".to_string(),
        port: 80,
        limit: 0,
    };
    assert_eq!(server.shape(), Shape::Record);
    assert_eq!(server.size(), 3);

    let fields = server.fields();
    assert_eq!(fields[0].name(), "host");
    assert!(fields[1].is_exported());
    assert!(!fields[2].is_exported());
    assert_eq!(server.child(1).map(|c| c.type_name()), Some(std::any::type_name::<u16>()));
    assert!(server.child(3).is_none());
}
