use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};

use inkfield_core::field::{FieldController, FieldOptions};
use inkfield_core::signature::{SignatureController, SignaturePad, StrokePoint};
use inkfield_protocol::LayoutSize;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Live controllers, addressed by handle. Disposed slots stay `None` so
/// handles are never reused.
static FIELDS: Mutex<Vec<Option<FieldController>>> = Mutex::new(Vec::new());
static SIGNATURES: Mutex<Vec<Option<SignatureController>>> = Mutex::new(Vec::new());

fn js_err(e: impl Display) -> JsError {
    JsError::new(&e.to_string())
}

fn lock<T>(registry: &Mutex<T>) -> Result<MutexGuard<'_, T>, JsError> {
    registry
        .lock()
        .map_err(|_| JsError::new("controller registry poisoned"))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(js_err)
}

fn slot<T>(registry: &mut [Option<T>], handle: usize) -> Result<&mut T, JsError> {
    registry
        .get_mut(handle)
        .and_then(Option::as_mut)
        .ok_or_else(|| JsError::new("invalid or disposed handle"))
}

fn insert<T>(registry: &mut Vec<Option<T>>, value: T) -> usize {
    registry.push(Some(value));
    registry.len() - 1
}

// --- Particle field ---

/// Create a field controller. `options` is JSON such as
/// `{"theme":"dark","low_capability":false}`; missing keys take defaults.
/// `seed` makes the population reproducible.
#[wasm_bindgen]
pub fn field_create(options: &str, dpr: f64, seed: u64) -> Result<usize, JsError> {
    let options: FieldOptions = if options.trim().is_empty() {
        FieldOptions::default()
    } else {
        serde_json::from_str(options).map_err(js_err)?
    };
    let mut fields = lock(&FIELDS)?;
    Ok(insert(&mut fields, FieldController::new(options, dpr, seed)))
}

/// Mount into a container laid out at `width`×`height`. Returns the frame
/// output (commands to draw, host requests to honor) as JSON.
#[wasm_bindgen]
pub fn field_mount(handle: usize, width: f64, height: f64) -> Result<String, JsError> {
    let mut fields = lock(&FIELDS)?;
    let out = slot(&mut fields, handle)?.mount(LayoutSize::new(width, height));
    to_json(&out)
}

#[wasm_bindgen]
pub fn field_resize(handle: usize) -> Result<String, JsError> {
    let mut fields = lock(&FIELDS)?;
    to_json(&slot(&mut fields, handle)?.on_resize())
}

#[wasm_bindgen]
pub fn field_timer(handle: usize, id: u64, width: f64, height: f64) -> Result<String, JsError> {
    let mut fields = lock(&FIELDS)?;
    let requests = slot(&mut fields, handle)?.on_timer(id, LayoutSize::new(width, height));
    to_json(&requests)
}

#[wasm_bindgen]
pub fn field_pointer_move(handle: usize, x: f64, y: f64, now: f64) -> Result<(), JsError> {
    let mut fields = lock(&FIELDS)?;
    slot(&mut fields, handle)?.on_pointer_move(x, y, now);
    Ok(())
}

#[wasm_bindgen]
pub fn field_frame(handle: usize, id: u64, now: f64) -> Result<String, JsError> {
    let mut fields = lock(&FIELDS)?;
    to_json(&slot(&mut fields, handle)?.on_frame(id, now))
}

#[wasm_bindgen]
pub fn field_static_layer(handle: usize, width: f64, height: f64) -> Result<String, JsError> {
    let mut fields = lock(&FIELDS)?;
    let commands = slot(&mut fields, handle)?.static_layer(LayoutSize::new(width, height));
    to_json(&commands)
}

/// Tear down a field. Returns the release requests as JSON; the handle is
/// invalid afterwards.
#[wasm_bindgen]
pub fn field_dispose(handle: usize) -> Result<String, JsError> {
    let mut fields = lock(&FIELDS)?;
    let requests = slot(&mut fields, handle)?.dispose();
    if let Some(entry) = fields.get_mut(handle) {
        *entry = None;
    }
    to_json(&requests)
}

// --- Signature pad ---

#[wasm_bindgen]
pub fn signature_create(dpr: f64) -> Result<usize, JsError> {
    let mut signatures = lock(&SIGNATURES)?;
    Ok(insert(&mut signatures, SignatureController::new(dpr)))
}

#[wasm_bindgen]
pub fn signature_mount(handle: usize) -> Result<String, JsError> {
    let mut signatures = lock(&SIGNATURES)?;
    to_json(&slot(&mut signatures, handle)?.mount())
}

#[wasm_bindgen]
pub fn signature_timer(handle: usize, id: u64, width: f64, height: f64) -> Result<String, JsError> {
    let mut signatures = lock(&SIGNATURES)?;
    let requests = slot(&mut signatures, handle)?.on_timer(id, LayoutSize::new(width, height));
    to_json(&requests)
}

fn with_pad<R>(handle: usize, f: impl FnOnce(&mut SignaturePad) -> R) -> Result<R, JsError> {
    let mut signatures = lock(&SIGNATURES)?;
    let pad = slot(&mut signatures, handle)?
        .pad_mut()
        .ok_or_else(|| js_err(inkfield_core::signature::SignatureError::NotReady))?;
    Ok(f(pad))
}

/// Start a stroke. Returns the commands to draw now as JSON.
#[wasm_bindgen]
pub fn signature_begin(handle: usize, x: f64, y: f64, t: f64) -> Result<String, JsError> {
    let dot = with_pad(handle, |pad| pad.begin_stroke(StrokePoint::new(x, y, t)))?;
    to_json(dot.as_slice())
}

#[wasm_bindgen]
pub fn signature_extend(handle: usize, x: f64, y: f64, t: f64) -> Result<String, JsError> {
    let segment = with_pad(handle, |pad| pad.extend_stroke(StrokePoint::new(x, y, t)))?;
    to_json(segment.as_slice())
}

#[wasm_bindgen]
pub fn signature_end(handle: usize) -> Result<(), JsError> {
    with_pad(handle, SignaturePad::end_stroke)
}

#[wasm_bindgen]
pub fn signature_clear(handle: usize) -> Result<(), JsError> {
    with_pad(handle, SignaturePad::clear)
}

/// Whether a touch event should have its default scrolling prevented.
#[wasm_bindgen]
pub fn signature_should_suppress_touch(handle: usize, on_surface: bool) -> Result<bool, JsError> {
    let mut signatures = lock(&SIGNATURES)?;
    Ok(slot(&mut signatures, handle)?.should_suppress_touch(on_surface))
}

/// Export the signature as PNG bytes. A too-short signature is an error
/// whose message can be shown to the user as-is.
#[wasm_bindgen]
pub fn signature_export_png(handle: usize) -> Result<Vec<u8>, JsError> {
    let image = with_pad(handle, |pad| pad.export_or_reject())?.map_err(js_err)?;
    Ok(image.png)
}

#[wasm_bindgen]
pub fn signature_export_svg(handle: usize) -> Result<String, JsError> {
    with_pad(handle, |pad| pad.export_svg())?.map_err(js_err)
}

#[wasm_bindgen]
pub fn signature_unmount(handle: usize) -> Result<String, JsError> {
    let mut signatures = lock(&SIGNATURES)?;
    let requests = slot(&mut signatures, handle)?.unmount();
    if let Some(entry) = signatures.get_mut(handle) {
        *entry = None;
    }
    to_json(&requests)
}
