use confwalk::Walk;

#[derive(Walk)]
struct Slot<T> {
    pub value: T,
    pub backup: Option<T>,
}

#[derive(Walk)]
struct Borrowed<'a, T: Clone>
where
    T: Default,
{
    pub items: &'a [T; 2],
}

fn main() {
    let slot = Slot {
        value: 5u8,
        backup: None,
    };
    let module = confwalk::scan(&slot).expect("scan");
    assert_eq!(module.parameters().len(), 1);

    let items = [1i32, 2];
    let borrowed = Borrowed { items: &items };
    assert_eq!(borrowed.size(), 1);
}
