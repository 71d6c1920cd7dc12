use drawit_system::camera::CameraRig;
use drawit_system::participant::SerialEvent;
use drawit_system::serde_json;
use wasm_bindgen::prelude::*;

/// Serial-controlled camera for the 3D box sketch. Every serial callback
/// returns the status line to display.
#[wasm_bindgen]
pub struct CameraDemo {
    rig: CameraRig,
}

#[wasm_bindgen]
impl CameraDemo {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        crate::utils::set_panic_hook();
        crate::utils::init_logger();

        Self {
            rig: CameraRig::new(),
        }
    }

    pub fn serial_opened(&mut self) -> String {
        self.rig.handle(SerialEvent::ConnectionOpened)
    }

    pub fn serial_closed(&mut self) -> String {
        self.rig.handle(SerialEvent::ConnectionClosed)
    }

    pub fn serial_error(&mut self, message: String) -> String {
        self.rig.handle(SerialEvent::ErrorOccurred(message))
    }

    pub fn serial_data(&mut self, line: String) -> String {
        self.rig.handle(SerialEvent::DataReceived(line))
    }

    /// `{eye, center, up}` for p5's `camera()`.
    pub fn pose(&self) -> String {
        serde_json::to_string(&self.rig.pose()).unwrap_or_else(|_| "null".into())
    }
}

impl std::default::Default for CameraDemo {
    fn default() -> Self {
        Self::new()
    }
}
