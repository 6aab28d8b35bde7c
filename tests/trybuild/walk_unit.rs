use confwalk::Walk;

#[derive(Walk)]
struct Marker;

#[derive(Walk)]
struct Braces {}

fn main() {
    assert_eq!(Marker.size(), 0);
    assert!(Marker.fields().is_empty());
    assert!(Braces {}.child(0).is_none());
    assert!(confwalk::scan(&Marker).expect("scan").is_empty());
}
