use drawit_system::{bincode, ClientMessage};
use drawit_wasm::Translator;

fn main() {
    let translator = Translator::new();
    let json = r#"{"voted":{"choice":"player"}}"#;
    let bytes = translator
        .client_message_to_bincode(json)
        .expect("valid client message");
    let message = bincode::deserialize::<ClientMessage>(&bytes).expect("valid bincode");
    println!("{}", json);
    println!("{:?}", bytes);
    println!("{:?}", message);
}
