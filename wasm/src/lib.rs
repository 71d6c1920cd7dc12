mod camera;
mod game_client;
mod utils;

use drawit_system::{bincode, decode_binary, decode_text, serde_json, ClientMessage, ServerMessage};
use wasm_bindgen::prelude::*;

pub use camera::CameraDemo;
pub use game_client::{GameClient, JsStrokeModel};

/// Converts messages between the JSON the sketches work with and the
/// compact bincode frames understood by the server.
#[wasm_bindgen]
pub struct Translator {}

#[wasm_bindgen]
impl Translator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        utils::set_panic_hook();
        utils::init_logger();

        Translator {}
    }

    pub fn client_message_to_bincode(&self, json: &str) -> Result<Box<[u8]>, JsValue> {
        let message = decode_text::<ClientMessage>(json).map_err(to_js_error)?;
        bincode::serialize(&message)
            .map(|bytes| bytes.into_boxed_slice())
            .map_err(to_js_error)
    }

    pub fn server_message_to_json(&self, bytes: &[u8]) -> Result<String, JsValue> {
        let message = decode_binary::<ServerMessage>(bytes).map_err(to_js_error)?;
        serde_json::to_string(&message).map_err(to_js_error)
    }
}

impl std::default::Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
