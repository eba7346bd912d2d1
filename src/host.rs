// Host boundary: the content surface and platform services the engine drives.
// The engine never touches document internals; it issues commands and receives results.

use serde::{Deserialize, Serialize};

use crate::click::HitTestId;
use crate::focus::InputOwner;
use crate::keyboard::LayoutSample;
use crate::types::{Point, PointerPhase};

/// The hosted, script-capable document.
pub trait ContentSurface {
    /// Delivers a synthetic touch event at `point`.
    fn dispatch_pointer(&mut self, point: Point, phase: PointerPhase);

    /// Starts an asynchronous classification of the element under `point`.
    /// The result comes back through `PointerEngine::on_hit_test_result` with `request`.
    fn request_hit_test(&mut self, request: HitTestId, point: Point);

    /// Gives document focus to the editable element under `point`.
    fn focus_element_at(&mut self, point: Point);

    /// Blurs the focused editable element, if any.
    fn blur_active_element(&mut self);

    fn scroll_by(&mut self, dx: i32, dy: i32);

    fn can_go_back(&self) -> bool;

    fn go_back(&mut self);

    fn load_url(&mut self, url: &str);

    fn current_url(&self) -> Option<String>;

    /// Removes links and buttons from the document's own focus traversal so
    /// d-pad keys do not move document focus behind the cursor.
    fn suppress_focus_navigation(&mut self);

    fn pause(&mut self);

    fn resume(&mut self);

    /// Final teardown; the surface is not used afterwards.
    fn release(&mut self);
}

/// Platform services around the surface: keyboard overlay and input focus.
pub trait PlatformServices {
    fn show_keyboard(&mut self);

    fn hide_keyboard(&mut self);

    fn input_owner(&self) -> InputOwner;

    fn claim_input(&mut self, owner: InputOwner);

    /// Current window layout, for the direct keyboard-height recheck.
    fn layout_sample(&self) -> Option<LayoutSample>;
}

/// Everything the engine needs from its embedder.
pub trait Host: ContentSurface + PlatformServices {}

impl<T: ContentSurface + PlatformServices> Host for T {}

/// A command the engine issued to its host, in issue order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostCommand {
    DispatchPointer { x: f32, y: f32, phase: PointerPhase },
    HitTest { request: HitTestId, x: f32, y: f32 },
    FocusElementAt { x: f32, y: f32 },
    BlurActiveElement,
    ScrollBy { dx: i32, dy: i32 },
    GoBack,
    LoadUrl { url: String },
    SuppressFocusNavigation,
    PauseSurface,
    ResumeSurface,
    ReleaseSurface,
    ShowKeyboard,
    HideKeyboard,
    ClaimInput { owner: InputOwner },
}

/// Host that records commands and answers queries from plain fields.
/// Backs the WASM facade, where JS replays the commands, and the engine tests.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    commands: Vec<HostCommand>,
    pub history: bool,
    pub url: Option<String>,
    pub owner: InputOwner,
    pub layout: Option<LayoutSample>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        RecordingHost {
            commands: Vec::new(),
            history: false,
            url: None,
            owner: InputOwner::Engine,
            layout: None,
        }
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    fn record(&mut self, command: HostCommand) {
        self.commands.push(command);
    }
}

impl ContentSurface for RecordingHost {
    fn dispatch_pointer(&mut self, point: Point, phase: PointerPhase) {
        self.record(HostCommand::DispatchPointer {
            x: point.x,
            y: point.y,
            phase,
        });
    }

    fn request_hit_test(&mut self, request: HitTestId, point: Point) {
        self.record(HostCommand::HitTest {
            request,
            x: point.x,
            y: point.y,
        });
    }

    fn focus_element_at(&mut self, point: Point) {
        self.record(HostCommand::FocusElementAt {
            x: point.x,
            y: point.y,
        });
    }

    fn blur_active_element(&mut self) {
        self.record(HostCommand::BlurActiveElement);
    }

    fn scroll_by(&mut self, dx: i32, dy: i32) {
        self.record(HostCommand::ScrollBy { dx, dy });
    }

    fn can_go_back(&self) -> bool {
        self.history
    }

    fn go_back(&mut self) {
        self.record(HostCommand::GoBack);
    }

    fn load_url(&mut self, url: &str) {
        self.url = Some(url.to_string());
        self.record(HostCommand::LoadUrl {
            url: url.to_string(),
        });
    }

    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }

    fn suppress_focus_navigation(&mut self) {
        self.record(HostCommand::SuppressFocusNavigation);
    }

    fn pause(&mut self) {
        self.record(HostCommand::PauseSurface);
    }

    fn resume(&mut self) {
        self.record(HostCommand::ResumeSurface);
    }

    fn release(&mut self) {
        self.record(HostCommand::ReleaseSurface);
    }
}

impl PlatformServices for RecordingHost {
    fn show_keyboard(&mut self) {
        self.record(HostCommand::ShowKeyboard);
    }

    fn hide_keyboard(&mut self) {
        self.record(HostCommand::HideKeyboard);
    }

    fn input_owner(&self) -> InputOwner {
        self.owner
    }

    fn claim_input(&mut self, owner: InputOwner) {
        self.owner = owner;
        self.record(HostCommand::ClaimInput { owner });
    }

    fn layout_sample(&self) -> Option<LayoutSample> {
        self.layout
    }
}
