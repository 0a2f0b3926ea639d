//! 图片与摄像头
//!
//! - 文件选择框中的 `File` 读取为 `UploadFile`
//! - 预览用的 Object URL（`blob:`），用完必须 revoke
//! - 摄像头取流、截帧为 JPEG、停止所有轨道

use aptportal_shared::booking::CAMERA_FILE_NAME;
use aptportal_shared::{PortalError, PortalResult, UploadFile};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, CanvasRenderingContext2d, File, HtmlCanvasElement, HtmlInputElement,
    HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack, Url,
};

const JPEG_MIME: &str = "image/jpeg";

fn js_err(context: &str, e: JsValue) -> PortalError {
    let detail = e.as_string().unwrap_or_else(|| format!("{:?}", e));
    PortalError::network(format!("{}: {}", context, detail))
}

// =========================================================
// 文件
// =========================================================

/// 取出 `<input type="file">` 变更事件中选中的第一个文件
pub fn selected_file(ev: &web_sys::Event) -> Option<File> {
    let input: HtmlInputElement = ev.target()?.dyn_into().ok()?;
    input.files()?.get(0)
}

/// 读取文件内容
pub async fn read_file(file: &File) -> PortalResult<UploadFile> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| js_err("read file", e))?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    Ok(UploadFile::new(file.name(), file.type_(), bytes))
}

// =========================================================
// Object URL
// =========================================================

/// 为上传文件创建预览地址
pub fn create_object_url(file: &UploadFile) -> PortalResult<String> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(file.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(&file.mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| js_err("blob", e))?;
    Url::create_object_url_with_blob(&blob).map_err(|e| js_err("object url", e))
}

/// 释放预览地址；`data:` 地址无需释放
pub fn revoke_object_url(url: &str) {
    if url.starts_with("blob:") {
        let _ = Url::revoke_object_url(url);
    }
}

/// 持有一个 Object URL，drop 时释放
#[derive(Debug)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(file: &UploadFile) -> PortalResult<Self> {
        create_object_url(file).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        revoke_object_url(&self.0);
    }
}

// =========================================================
// 摄像头
// =========================================================

/// 打开摄像头并绑定到 `<video>`
pub async fn start_camera(video: &HtmlVideoElement) -> PortalResult<MediaStream> {
    let devices = web_sys::window()
        .ok_or_else(|| PortalError::network("window is not available"))?
        .navigator()
        .media_devices()
        .map_err(|e| js_err("camera unavailable", e))?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&JsValue::TRUE);
    constraints.set_audio(&JsValue::FALSE);

    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| js_err("camera unavailable", e))?;
    let stream: MediaStream = JsFuture::from(promise)
        .await
        .map_err(|e| js_err("camera permission", e))?
        .dyn_into()
        .map_err(|e| js_err("camera stream", e))?;

    video.set_src_object(Some(&stream));
    if let Ok(play) = video.play() {
        let _ = JsFuture::from(play).await;
    }
    Ok(stream)
}

/// 停止流上的所有轨道
pub fn stop_camera(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

/// 截取当前帧为 JPEG，返回文件与可直接预览的 data URL
pub fn capture_frame(video: &HtmlVideoElement) -> PortalResult<(UploadFile, String)> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| PortalError::network("document is not available"))?;

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| js_err("canvas", e))?
        .dyn_into()
        .map_err(|e| js_err("canvas", e.into()))?;
    let (width, height) = (video.video_width(), video.video_height());
    if width == 0 || height == 0 {
        return Err(PortalError::validation("The camera is not ready yet"));
    }
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(|e| js_err("canvas context", e))?
        .ok_or_else(|| PortalError::network("canvas context unavailable"))?
        .dyn_into()
        .map_err(|e| js_err("canvas context", e.into()))?;
    ctx.draw_image_with_html_video_element(video, 0.0, 0.0)
        .map_err(|e| js_err("draw frame", e))?;

    let data_url = canvas
        .to_data_url_with_type(JPEG_MIME)
        .map_err(|e| js_err("encode frame", e))?;
    let bytes = decode_data_url(&data_url)?;
    Ok((UploadFile::new(CAMERA_FILE_NAME, JPEG_MIME, bytes), data_url))
}

/// `data:image/jpeg;base64,...` → 原始字节（借助 `atob`）
fn decode_data_url(data_url: &str) -> PortalResult<Vec<u8>> {
    let (_, encoded) = data_url
        .split_once(',')
        .ok_or_else(|| PortalError::decode("malformed data URL"))?;
    let window = web_sys::window().ok_or_else(|| PortalError::network("window is not available"))?;
    let binary = window.atob(encoded).map_err(|e| js_err("atob", e))?;
    Ok(binary.chars().map(|c| c as u32 as u8).collect())
}
