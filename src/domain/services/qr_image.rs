use std::io::Cursor;
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use crate::error::AppError;

const MIN_DIMENSION: u32 = 300;

/// Renders `data` (normally a redemption URL) as a PNG QR code.
pub fn render_png(data: &str) -> Result<Vec<u8>, AppError> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| AppError::InternalWithMsg(format!("QR encode error: {:?}", e)))?;

    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .quiet_zone(true)
        .build();

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AppError::InternalWithMsg(format!("PNG encode error: {:?}", e)))?;
    Ok(bytes)
}
