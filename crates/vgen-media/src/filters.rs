//! FFmpeg filter fragments used by composition.

use vgen_models::PipPosition;

/// Distance in pixels between the picture-in-picture avatar and the frame edges.
pub const PIP_MARGIN: u32 = 20;
/// `colorkey` similarity for removing the avatar backdrop.
pub const CHROMA_SIMILARITY: f32 = 0.3;
/// `colorkey` edge blend.
pub const CHROMA_BLEND: f32 = 0.2;

/// Letterbox any input into a `width`x`height` frame at a fixed rate.
pub fn fit_to_frame(width: u32, height: u32, fps: u32) -> String {
    format!(
        "scale={width}:{height}:force_original_aspect_ratio=decrease,\
         pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1,fps={fps}"
    )
}

/// Convert `#RRGGBB` (or bare `RRGGBB`) to FFmpeg's `0xRRGGBB`.
pub fn ffmpeg_color(hex: &str) -> Option<String> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("0x{}", digits.to_ascii_uppercase()))
    } else {
        None
    }
}

/// Make pixels close to `color` transparent.
pub fn chroma_key(color: &str) -> String {
    format!("colorkey={color}:{CHROMA_SIMILARITY}:{CHROMA_BLEND}")
}

/// Overlay coordinates for a corner placement.
pub fn overlay_position(position: PipPosition, margin: u32) -> String {
    match position {
        PipPosition::TopLeft => format!("{margin}:{margin}"),
        PipPosition::TopRight => format!("W-w-{margin}:{margin}"),
        PipPosition::BottomLeft => format!("{margin}:H-h-{margin}"),
        PipPosition::BottomRight => format!("W-w-{margin}:H-h-{margin}"),
    }
}

/// Width of the avatar window, rounded down to an even number for yuv420p.
pub fn pip_width(frame_width: u32, ratio: f64) -> u32 {
    let width = (frame_width as f64 * ratio).round() as u32;
    (width & !1).max(2)
}

/// `[a][b]...concat=n=N:v=1:a=0[out]`
pub fn concat_video(labels: &[String], output: &str) -> String {
    let inputs: String = labels.iter().map(|l| format!("[{l}]")).collect();
    format!("{inputs}concat=n={}:v=1:a=0[{output}]", labels.len())
}
