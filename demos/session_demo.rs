use std::time::{Duration, Instant};

use stickshift::backends::VirtualGamepads;
use stickshift::camera::{FixedCamera, Quat};
use stickshift::error::PointerLockError;
use stickshift::keys::select_resolver;
use stickshift::pointer::PointerCapture;
use stickshift::{
    ActionSlot, BindingProfile, Config, ControllerSession, InputEvent, InputKind, KeyEvent,
    MouseButton, QueuedSink,
};

const PROFILE: &str = r#"
name = "default"
description = "QWERTY defaults"

[actions]
MOVE_FORWARD = [["KEY_W"], ["KEY_38"]]
MOVE_BACKWARD = [["KEY_S"], ["KEY_40"]]
JUMP = [["KEY_32"]]
"#;

/// Pretends to be a windowing system that always grants pointer lock.
struct PrintCapture;

impl PointerCapture for PrintCapture {
    fn request_lock(&mut self) -> Result<(), PointerLockError> {
        println!("(platform) pointer lock requested");
        Ok(())
    }

    fn exit_lock(&mut self) {
        println!("(platform) pointer lock released");
    }
}

fn flush(session: &mut ControllerSession<QueuedSink, PrintCapture, FixedCamera>) {
    match session.remote_mut().drain_json() {
        Ok(lines) => lines.iter().for_each(|l| println!("-> {l}")),
        Err(e) => eprintln!("failed to encode remote commands: {e}"),
    }
}

fn main() -> stickshift::Result<()> {
    stickshift::logger::init(tracing::Level::DEBUG);

    let config = Config::from_toml_str("behavior_id = \"first-person-controller\"")?;
    let profile = BindingProfile::from_toml_str(PROFILE)?;
    let camera = FixedCamera(Quat::from_axis_angle([0.0, 1.0, 0.0], 45.0));

    let mut pads = VirtualGamepads::new();
    let mut session = ControllerSession::new(
        &config,
        profile.actions,
        select_resolver(None),
        QueuedSink::new(),
        PrintCapture,
        camera,
    );

    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);

    session.start(t0, &mut pads);
    flush(&mut session);

    println!("== click to lock the pointer");
    session.handle_event(&InputEvent::new(
        at(10),
        InputKind::MouseButtonPressed {
            button: MouseButton::Primary,
        },
    ));
    session.handle_event(&InputEvent::new(
        at(20),
        InputKind::PointerLockChanged { locked: true },
    ));

    println!("== plug in a gamepad and push the right stick");
    let connect = pads.connect("pad:0", "Virtual Pad", 4, at(100));
    session.handle_event(&connect);
    pads.set_axis("pad:0", 2, 0.9);
    session.tick(at(200), &mut pads);
    println!("active device: {}", session.active_device());
    flush(&mut session);

    println!("== rebind MOVE_FORWARD to Shift + W");
    session.start_rebind(ActionSlot::new("MOVE_FORWARD", 0), at(300));
    session.handle_event(&InputEvent::new(
        at(400),
        InputKind::KeyPressed(KeyEvent::new("Shift", Some("ShiftLeft"), 16)),
    ));
    session.handle_event(&InputEvent::new(
        at(500),
        InputKind::KeyPressed(KeyEvent::letter('w')),
    ));
    println!("capturing: {}", session.rebinder().live_display());
    session.tick(at(3500), &mut pads);
    println!("outcome: {:?}", session.take_capture_outcome());
    flush(&mut session);

    for (slot, label) in session.binding_labels() {
        println!("{:<18} {label}", slot.to_string());
    }
    Ok(())
}
