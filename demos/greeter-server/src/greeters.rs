use routekit::prelude::*;

pub trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Injectable)]
#[injectable(alias = dyn Greeter)]
pub struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self) -> String {
        "Hello, world!".to_string()
    }
}

#[derive(Injectable)]
pub struct SpanishGreeter;

impl SpanishGreeter {
    pub fn greet(&self) -> String {
        "Hola, mundo!".to_string()
    }
}

#[derive(Injectable)]
pub struct NestedGreeter {
    spanish: Arc<SpanishGreeter>,
}

impl NestedGreeter {
    pub fn greet(&self) -> String {
        self.spanish.greet()
    }
}
