use web_sys as web;

/// Pointer position in canvas backing pixels, origin at the bottom-left to
/// match fragment coordinates.
#[inline]
pub fn pointer_surface_px(
    ev: &web::PointerEvent,
    canvas: &web::HtmlCanvasElement,
) -> Option<[f32; 2]> {
    let rect = canvas.get_bounding_client_rect();
    let w = rect.width() as f32;
    let h = rect.height() as f32;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let x_css = ev.client_x() as f32 - rect.left() as f32;
    let y_css = ev.client_y() as f32 - rect.top() as f32;
    let sx = (x_css / w) * canvas.width() as f32;
    let sy = (y_css / h) * canvas.height() as f32;
    Some([sx, canvas.height() as f32 - sy])
}
