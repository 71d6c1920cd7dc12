use std::cell::RefCell;
use std::rc::Rc;

use drawit_system::model::{drive_model, ModelError, StrokeModel};
use drawit_system::participant::{Effect, LocalInput, Participant, ParticipantEvent, SerialEvent};
use drawit_system::{decode_text, serde_json, Choice, ServerMessage, StrokeDelta};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

#[wasm_bindgen]
extern "C" {
    /// A SketchRNN model wrapped so that `generate()` returns a promise
    /// resolving to `{dx, dy, pen}`.
    pub type JsStrokeModel;

    #[wasm_bindgen(method)]
    fn reset(this: &JsStrokeModel);

    #[wasm_bindgen(method)]
    fn generate(this: &JsStrokeModel) -> js_sys::Promise;
}

struct ModelAdapter(JsStrokeModel);

impl StrokeModel for ModelAdapter {
    fn reset(&mut self) {
        self.0.reset();
    }

    async fn generate(&mut self) -> Result<StrokeDelta, ModelError> {
        let value = JsFuture::from(self.0.generate())
            .await
            .map_err(|err| ModelError(describe(&err)))?;
        let json: String = js_sys::JSON::stringify(&value)
            .map_err(|err| ModelError(describe(&err)))?
            .into();
        serde_json::from_str(&json).map_err(|err| ModelError(err.to_string()))
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// One browser tab of the game. Effects are handed to `on_effects` as a JSON
/// array; the page renders them, forwards `send` payloads over the socket and
/// writes `writeSerial` tokens to the device.
#[wasm_bindgen]
pub struct GameClient {
    participant: Rc<RefCell<Participant>>,
    on_effects: js_sys::Function,
}

#[wasm_bindgen]
impl GameClient {
    #[wasm_bindgen(constructor)]
    pub fn new(on_effects: js_sys::Function) -> Self {
        crate::utils::set_panic_hook();
        crate::utils::init_logger();

        Self {
            participant: Rc::new(RefCell::new(Participant::new())),
            on_effects,
        }
    }

    pub fn state(&self) -> String {
        format!("{:?}", self.participant.borrow().state())
    }

    pub fn serial_opened(&self) {
        self.dispatch(ParticipantEvent::Serial(SerialEvent::ConnectionOpened));
    }

    pub fn serial_closed(&self) {
        self.dispatch(ParticipantEvent::Serial(SerialEvent::ConnectionClosed));
    }

    pub fn serial_error(&self, message: String) {
        self.dispatch(ParticipantEvent::Serial(SerialEvent::ErrorOccurred(message)));
    }

    pub fn serial_data(&self, line: String) {
        self.dispatch(ParticipantEvent::Serial(SerialEvent::DataReceived(line)));
    }

    /// `json` is one text frame received from the server.
    pub fn server_message(&self, json: &str) -> Result<(), JsValue> {
        let message = decode_text::<ServerMessage>(json)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        self.dispatch(ParticipantEvent::Server(message));
        Ok(())
    }

    pub fn pointer_drag(&self, x: f32, y: f32) {
        self.dispatch(ParticipantEvent::Input(LocalInput::PointerDrag { x, y }));
    }

    pub fn key_pressed(&self, key: char) {
        self.dispatch(ParticipantEvent::Input(LocalInput::Key(key)));
    }

    pub fn finish(&self) {
        self.dispatch(ParticipantEvent::Input(LocalInput::Finish));
    }

    pub fn begin_voting(&self) {
        self.dispatch(ParticipantEvent::Input(LocalInput::BeginVoting));
    }

    pub fn vote_player(&self) {
        self.dispatch(ParticipantEvent::Input(LocalInput::CastVote(Choice::Player)));
    }

    pub fn vote_computer(&self) {
        self.dispatch(ParticipantEvent::Input(LocalInput::CastVote(
            Choice::Computer,
        )));
    }

    /// Call after a `startModel` effect, once the model for the word is loaded.
    /// The returned promise resolves when the computer has finished drawing.
    pub fn start_computer_drawing(&self, model: JsStrokeModel) -> js_sys::Promise {
        let participant = self.participant.clone();
        let on_effects = self.on_effects.clone();
        future_to_promise(async move {
            let mut model = ModelAdapter(model);
            drive_model(&mut model, &participant, |effects| {
                emit(&on_effects, effects)
            })
            .await;
            Ok(JsValue::UNDEFINED)
        })
    }

    fn dispatch(&self, event: ParticipantEvent) {
        let effects = self.participant.borrow_mut().handle(event);
        // the model driver issues stroke requests itself
        let effects = effects
            .into_iter()
            .filter(|effect| *effect != Effect::RequestStroke)
            .collect();
        emit(&self.on_effects, effects);
    }
}

fn emit(on_effects: &js_sys::Function, effects: Vec<Effect>) {
    if effects.is_empty() {
        return;
    }
    match serde_json::to_string(&effects) {
        Ok(json) => {
            if let Err(err) = on_effects.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::error!("effect callback failed: {}", describe(&err));
            }
        }
        Err(err) => log::error!("cannot serialize effects: {}", err),
    }
}
