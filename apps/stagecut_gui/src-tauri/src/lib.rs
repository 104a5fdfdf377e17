mod backend;
mod history;
mod state;

use backend::RunpodBackend;
use history::History;
use state::{ActiveJob, AppState};

use stagecut_core::clip::{ClipKind, ClipRef, Placed, SoundClip, TextClip, VideoClip};
use stagecut_core::document::Document;
use stagecut_core::geometry::{LaneBand, LaneLayout, Point};
use stagecut_core::gesture::Modifiers;
use stagecut_core::timeline::{CommitOutcome, TimelineController};
use stagecut_core::units::{self, Px};
use stagecut_core::{lanes, magnet};
use stagecut_jobs::poll::{cancel_pair, poll_until_settled, PollConfig};
use stagecut_jobs::{GenerationRequest, JobBackend, MediaPayload};

use tauri::Emitter;
use tauri::Manager;

fn parse_kind(kind: &str) -> Result<ClipKind, String> {
    match kind {
        "video" => Ok(ClipKind::Video),
        "text" => Ok(ClipKind::Text),
        "sound" => Ok(ClipKind::Sound),
        other => Err(format!("unknown clip kind: {other}")),
    }
}

fn parse_id(id: &str) -> Result<uuid::Uuid, String> {
    uuid::Uuid::parse_str(id).map_err(|e| e.to_string())
}

fn doc_json(doc: &Document) -> Result<serde_json::Value, String> {
    serde_json::to_value(doc).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[tauri::command]
fn get_document(state: tauri::State<AppState>) -> Result<serde_json::Value, String> {
    let doc = state.doc.lock().unwrap();
    doc_json(&doc)
}

#[tauri::command]
fn new_document(name: String, state: tauri::State<AppState>) -> Result<serde_json::Value, String> {
    let mut doc = state.doc.lock().unwrap();
    *doc = Document::new(name);
    *state.history.lock().unwrap() = History::new(100);
    state.timeline.lock().unwrap().clear_selection();
    doc_json(&doc)
}

#[tauri::command]
fn save_document(path: String, state: tauri::State<AppState>) -> Result<(), String> {
    let doc = state.doc.lock().unwrap();
    doc.save_to_file(&path).map_err(|e| e.to_string())
}

#[tauri::command]
fn load_document(path: String, state: tauri::State<AppState>) -> Result<serde_json::Value, String> {
    let loaded = Document::load_from_file(&path).map_err(|e| e.to_string())?;
    let mut doc = state.doc.lock().unwrap();
    *doc = loaded;
    *state.history.lock().unwrap() = History::new(100);
    state.timeline.lock().unwrap().clear_selection();
    doc_json(&doc)
}

// ---------------------------------------------------------------------------
// Layout & pointer forwarding
// ---------------------------------------------------------------------------

/// The frontend reports measured lane rectangles whenever its layout
/// changes; all hit-testing afterwards happens engine-side.
#[tauri::command]
fn set_lane_layout(
    header_height: f32,
    bands: Vec<LaneBand>,
    state: tauri::State<AppState>,
) -> Result<(), String> {
    let mut layout = LaneLayout::new(header_height);
    layout.set_bands(bands);
    state.timeline.lock().unwrap().set_layout(layout);
    Ok(())
}

#[tauri::command]
fn timeline_pointer_down(
    x: f32,
    y: f32,
    shift: bool,
    state: tauri::State<AppState>,
) -> Result<serde_json::Value, String> {
    let doc = state.doc.lock().unwrap();
    let mut timeline = state.timeline.lock().unwrap();
    timeline.pointer_down(&doc, Point::new(x, y), Modifiers { shift });
    Ok(serde_json::json!({
        "selection": selection_json(&timeline),
    }))
}

#[tauri::command]
fn timeline_pointer_move(
    x: f32,
    y: f32,
    state: tauri::State<AppState>,
) -> Result<serde_json::Value, String> {
    let doc = state.doc.lock().unwrap();
    let mut timeline = state.timeline.lock().unwrap();
    let seek = timeline.pointer_move(&doc, Point::new(x, y));
    let ghosts = timeline.ghost(&doc);
    let resize = timeline.resize_preview(&doc).map(|(clip, position, duration)| {
        serde_json::json!({
            "clip": clip,
            "position": position,
            "duration": duration,
        })
    });
    Ok(serde_json::json!({
        "seek": seek.map(|t| t.as_seconds()),
        "ghosts": ghosts,
        "resize": resize,
        "selection": selection_json(&timeline),
    }))
}

#[tauri::command]
fn timeline_pointer_up(
    x: f32,
    y: f32,
    state: tauri::State<AppState>,
) -> Result<serde_json::Value, String> {
    let mut doc = state.doc.lock().unwrap();
    let mut timeline = state.timeline.lock().unwrap();
    let snapshot = doc.clone();
    match timeline.pointer_up(&mut doc, Point::new(x, y)) {
        CommitOutcome::None => Ok(serde_json::json!({"outcome": "none"})),
        CommitOutcome::Applied => {
            state.history.lock().unwrap().push(snapshot);
            Ok(serde_json::json!({"outcome": "applied", "document": doc_json(&doc)?}))
        }
        CommitOutcome::NeedsConfirmation(pending) => Ok(serde_json::json!({
            "outcome": "confirm_replace",
            "pending": pending,
        })),
    }
}

/// Resolves the replace gate raised by `timeline_pointer_up`. Declining
/// leaves everything untouched.
#[tauri::command]
fn confirm_replace(
    accept: bool,
    state: tauri::State<AppState>,
) -> Result<serde_json::Value, String> {
    let mut doc = state.doc.lock().unwrap();
    let mut timeline = state.timeline.lock().unwrap();
    let snapshot = doc.clone();
    if timeline.resolve_replace(&mut doc, accept) {
        state.history.lock().unwrap().push(snapshot);
    }
    doc_json(&doc)
}

fn selection_json(timeline: &TimelineController) -> serde_json::Value {
    let ids: Vec<serde_json::Value> = timeline
        .selection()
        .ids()
        .iter()
        .map(|r| serde_json::json!({"kind": r.kind, "id": r.id}))
        .collect();
    serde_json::json!(ids)
}

// ---------------------------------------------------------------------------
// Transport & zoom
// ---------------------------------------------------------------------------

#[tauri::command]
fn zoom_in(state: tauri::State<AppState>) -> f64 {
    let mut timeline = state.timeline.lock().unwrap();
    timeline.zoom_in();
    timeline.zoom().percent()
}

#[tauri::command]
fn zoom_out(state: tauri::State<AppState>) -> f64 {
    let mut timeline = state.timeline.lock().unwrap();
    timeline.zoom_out();
    timeline.zoom().percent()
}

/// Returns the playhead actually reached after clamping to the 3-minute cap.
#[tauri::command]
fn seek(seconds: f64, state: tauri::State<AppState>) -> f64 {
    let mut timeline = state.timeline.lock().unwrap();
    timeline.seek(Px::from_seconds(seconds));
    timeline.playhead().as_seconds()
}

#[tauri::command]
fn get_zoom(state: tauri::State<AppState>) -> serde_json::Value {
    let timeline = state.timeline.lock().unwrap();
    let zoom = timeline.zoom();
    serde_json::json!({
        "percent": zoom.percent(),
        "pixelsPerSecond": zoom.pixels_per_second(),
        "canZoomIn": zoom.can_zoom_in(),
        "canZoomOut": zoom.can_zoom_out(),
    })
}

/// Second markers and the 3-minute hard-limit marker, in screen pixels for
/// the current zoom.
#[tauri::command]
fn get_ruler(state: tauri::State<AppState>) -> serde_json::Value {
    let timeline = state.timeline.lock().unwrap();
    let zoom = timeline.zoom();
    let ticks: Vec<serde_json::Value> = units::ruler_ticks(&zoom)
        .into_iter()
        .map(|(x, second)| serde_json::json!({"x": x, "second": second}))
        .collect();
    serde_json::json!({
        "ticks": ticks,
        "hardLimitX": units::hard_limit_marker_x(&zoom),
    })
}

#[tauri::command]
fn play_pause(state: tauri::State<AppState>) -> bool {
    let mut timeline = state.timeline.lock().unwrap();
    timeline.toggle_playback();
    timeline.is_playing()
}

#[tauri::command]
fn timeline_length(state: tauri::State<AppState>) -> f64 {
    let doc = state.doc.lock().unwrap();
    let timeline = state.timeline.lock().unwrap();
    timeline.timeline_len(&doc).as_seconds()
}

// ---------------------------------------------------------------------------
// Lanes
// ---------------------------------------------------------------------------

#[tauri::command]
fn get_lanes(kind: String, state: tauri::State<AppState>) -> Result<serde_json::Value, String> {
    let kind = parse_kind(&kind)?;
    let doc = state.doc.lock().unwrap();
    let timeline = state.timeline.lock().unwrap();
    let (list, used) = match kind {
        ClipKind::Video => (&doc.video_lanes, lanes::used_lanes(&doc.video)),
        ClipKind::Text => (&doc.text_lanes, lanes::used_lanes(&doc.text)),
        ClipKind::Sound => (&doc.sound_lanes, lanes::used_lanes(&doc.sound)),
    };
    Ok(serde_json::json!({
        "lanes": list,
        "usedLanes": used,
        "canAdd": timeline.can_add_lane(&doc, kind),
    }))
}

#[tauri::command]
fn add_lane(kind: String, state: tauri::State<AppState>) -> Result<usize, String> {
    let kind = parse_kind(&kind)?;
    let mut doc = state.doc.lock().unwrap();
    let mut timeline = state.timeline.lock().unwrap();
    let snapshot = doc.clone();
    let index = timeline.add_lane(&mut doc, kind).map_err(|e| e.to_string())?;
    state.history.lock().unwrap().push(snapshot);
    Ok(index)
}

#[tauri::command]
fn remove_lane(
    kind: String,
    index: usize,
    state: tauri::State<AppState>,
) -> Result<serde_json::Value, String> {
    let kind = parse_kind(&kind)?;
    let mut doc = state.doc.lock().unwrap();
    let mut timeline = state.timeline.lock().unwrap();
    let snapshot = doc.clone();
    timeline
        .remove_lane(&mut doc, kind, index)
        .map_err(|e| e.to_string())?;
    state.history.lock().unwrap().push(snapshot);
    doc_json(&doc)
}

/// Creates a default-length clip at the end of the lane's content. Ids are
/// minted here; the engine never invents them.
#[tauri::command]
fn add_clip_to_lane(
    kind: String,
    lane_index: usize,
    state: tauri::State<AppState>,
) -> Result<serde_json::Value, String> {
    let kind = parse_kind(&kind)?;
    let mut doc = state.doc.lock().unwrap();
    let snapshot = doc.clone();
    let duration = Px::from_seconds(4.0);

    match kind {
        ClipKind::Video => {
            if !doc.video_lanes.contains(&lane_index) {
                return Err(format!("video lane {lane_index} does not exist"));
            }
            let in_lane: Vec<&VideoClip> = lanes::clips_in_lane(&doc.video, lane_index);
            let at = in_lane.iter().map(|c| c.end()).fold(Px::ZERO, Px::max);
            let position = magnet::snap_position(&in_lane, at, duration);
            let mut clip = VideoClip::new(uuid::Uuid::new_v4(), "Untitled clip", position, duration);
            clip.lane_index = lane_index;
            doc.video.push(clip);
        }
        ClipKind::Text => {
            if !doc.text_lanes.contains(&lane_index) {
                return Err(format!("text lane {lane_index} does not exist"));
            }
            let in_lane: Vec<&TextClip> = lanes::clips_in_lane(&doc.text, lane_index);
            let at = in_lane.iter().map(|c| c.end()).fold(Px::ZERO, Px::max);
            let position = magnet::snap_position(&in_lane, at, duration);
            let mut clip = TextClip::new(uuid::Uuid::new_v4(), "New text", position, duration);
            clip.lane_index = lane_index;
            doc.text.push(clip);
        }
        ClipKind::Sound => {
            if !doc.sound_lanes.contains(&lane_index) {
                return Err(format!("sound lane {lane_index} does not exist"));
            }
            let in_lane: Vec<&SoundClip> = lanes::clips_in_lane(&doc.sound, lane_index);
            let at = in_lane.iter().map(|c| c.end()).fold(Px::ZERO, Px::max);
            let position = magnet::snap_position(&in_lane, at, duration);
            let mut clip = SoundClip::new(uuid::Uuid::new_v4(), "Untitled sound", position, duration);
            clip.lane_index = lane_index;
            doc.sound.push(clip);
        }
    }

    state.history.lock().unwrap().push(snapshot);
    doc_json(&doc)
}

// ---------------------------------------------------------------------------
// Selection & toolbar
// ---------------------------------------------------------------------------

#[tauri::command]
fn select_clip(kind: String, id: String, state: tauri::State<AppState>) -> Result<(), String> {
    let clip = ClipRef::new(parse_kind(&kind)?, parse_id(&id)?);
    state.timeline.lock().unwrap().select(clip);
    Ok(())
}

#[tauri::command]
fn clear_selection(state: tauri::State<AppState>) {
    state.timeline.lock().unwrap().clear_selection();
}

#[tauri::command]
fn get_selection(state: tauri::State<AppState>) -> serde_json::Value {
    let timeline = state.timeline.lock().unwrap();
    selection_json(&timeline)
}

#[tauri::command]
fn delete_selected(state: tauri::State<AppState>) -> Result<serde_json::Value, String> {
    let mut doc = state.doc.lock().unwrap();
    let mut timeline = state.timeline.lock().unwrap();
    let snapshot = doc.clone();
    if timeline.delete_selected(&mut doc) > 0 {
        state.history.lock().unwrap().push(snapshot);
    }
    doc_json(&doc)
}

#[tauri::command]
fn duplicate_selected(state: tauri::State<AppState>) -> Result<serde_json::Value, String> {
    let mut doc = state.doc.lock().unwrap();
    let mut timeline = state.timeline.lock().unwrap();
    let snapshot = doc.clone();
    timeline
        .duplicate_selected(&mut doc, uuid::Uuid::new_v4())
        .map_err(|e| e.to_string())?;
    state.history.lock().unwrap().push(snapshot);
    doc_json(&doc)
}

#[tauri::command]
fn can_split(state: tauri::State<AppState>) -> bool {
    let doc = state.doc.lock().unwrap();
    let timeline = state.timeline.lock().unwrap();
    timeline.can_split(&doc)
}

#[tauri::command]
fn split_selected(state: tauri::State<AppState>) -> Result<serde_json::Value, String> {
    let mut doc = state.doc.lock().unwrap();
    let mut timeline = state.timeline.lock().unwrap();
    let snapshot = doc.clone();
    timeline
        .split_selected(&mut doc, uuid::Uuid::new_v4())
        .map_err(|e| e.to_string())?;
    state.history.lock().unwrap().push(snapshot);
    doc_json(&doc)
}

/// Inspector updates for a single clip. Geometry never changes here; that
/// goes through the gesture engine.
#[tauri::command]
fn update_clip_property(
    kind: String,
    id: String,
    property: String,
    value: serde_json::Value,
    state: tauri::State<AppState>,
) -> Result<serde_json::Value, String> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(&id)?;
    let mut doc = state.doc.lock().unwrap();
    let snapshot = doc.clone();

    match kind {
        ClipKind::Video => {
            let clip = doc
                .video
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or("clip not found")?;
            match property.as_str() {
                "title" => {
                    clip.title = value.as_str().ok_or("invalid title value")?.to_string();
                }
                _ => return Err(format!("unknown property: {property}")),
            }
        }
        ClipKind::Text => {
            let clip = doc
                .text
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or("clip not found")?;
            match property.as_str() {
                "content" => {
                    clip.content = value.as_str().ok_or("invalid content value")?.to_string();
                }
                "font" => {
                    clip.style.font = value.as_str().ok_or("invalid font value")?.to_string();
                }
                "color" => {
                    clip.style.color = value.as_str().ok_or("invalid color value")?.to_string();
                }
                "align" => {
                    clip.style.align =
                        serde_json::from_value(value).map_err(|e| e.to_string())?;
                }
                "size_ratio" => {
                    clip.style.size_ratio = value.as_f64().ok_or("invalid size_ratio value")?;
                }
                "effect" => {
                    clip.effect = serde_json::from_value(value).map_err(|e| e.to_string())?;
                }
                _ => return Err(format!("unknown property: {property}")),
            }
        }
        ClipKind::Sound => {
            let clip = doc
                .sound
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or("clip not found")?;
            match property.as_str() {
                "title" => {
                    clip.title = value.as_str().ok_or("invalid title value")?.to_string();
                }
                "volume" => {
                    clip.set_volume(value.as_f64().ok_or("invalid volume value")? as f32);
                }
                "fade_in" => {
                    clip.set_fade_in(Px(value.as_f64().ok_or("invalid fade_in value")?));
                }
                "fade_out" => {
                    clip.set_fade_out(Px(value.as_f64().ok_or("invalid fade_out value")?));
                }
                _ => return Err(format!("unknown property: {property}")),
            }
        }
    }

    state.history.lock().unwrap().push(snapshot);
    doc_json(&doc)
}

// ---------------------------------------------------------------------------
// Undo / redo
// ---------------------------------------------------------------------------

#[tauri::command]
fn undo(state: tauri::State<AppState>) -> Result<serde_json::Value, String> {
    let mut doc = state.doc.lock().unwrap();
    let mut history = state.history.lock().unwrap();
    match history.undo(&doc) {
        Some(previous) => {
            *doc = previous;
            doc_json(&doc)
        }
        None => Err("nothing to undo".into()),
    }
}

#[tauri::command]
fn redo(state: tauri::State<AppState>) -> Result<serde_json::Value, String> {
    let mut doc = state.doc.lock().unwrap();
    let mut history = state.history.lock().unwrap();
    match history.redo(&doc) {
        Some(next) => {
            *doc = next;
            doc_json(&doc)
        }
        None => Err("nothing to redo".into()),
    }
}

#[tauri::command]
fn get_history_state(state: tauri::State<AppState>) -> serde_json::Value {
    let history = state.history.lock().unwrap();
    serde_json::json!({
        "canUndo": history.can_undo(),
        "canRedo": history.can_redo(),
    })
}

// ---------------------------------------------------------------------------
// Generation & export
// ---------------------------------------------------------------------------

#[tauri::command]
async fn start_generation(
    effect: String,
    workflow: serde_json::Value,
    images: Vec<MediaPayload>,
    state: tauri::State<'_, AppState>,
    app: tauri::AppHandle,
) -> Result<String, String> {
    let backend =
        RunpodBackend::from_env().ok_or("generation backend is not configured")?;
    let request = GenerationRequest {
        effect,
        workflow,
        images,
    };

    let job_id = backend.submit(&request).await.map_err(|e| e.to_string())?;
    tracing::info!(job = %job_id, "generation submitted");

    let (handle, token) = cancel_pair();
    *state.generation.lock().unwrap() = Some(ActiveJob {
        id: job_id.clone(),
        cancel: handle,
    });

    let id = job_id.clone();
    tokio::spawn(async move {
        let result = poll_until_settled(&backend, &id, PollConfig::default(), token).await;
        let payload = match result {
            Ok(report) => serde_json::json!({
                "id": id.0,
                "status": report.status,
                "output": report.output,
            }),
            Err(e) => serde_json::json!({
                "id": id.0,
                "status": "error",
                "message": e.to_string(),
            }),
        };
        let _ = app.emit("generation-status", payload);
    });

    Ok(job_id.0)
}

#[tauri::command]
fn cancel_generation(state: tauri::State<AppState>) -> bool {
    match state.generation.lock().unwrap().take() {
        Some(job) => {
            tracing::info!(job = %job.id, "generation canceled by user");
            job.cancel.cancel();
            true
        }
        None => false,
    }
}

/// Validates the 3-minute cap and hands the frontend a ready-to-submit
/// export request. Over-long timelines are refused with a user-facing
/// message.
#[tauri::command]
fn prepare_export(
    width: u32,
    height: u32,
    fps: f64,
    state: tauri::State<AppState>,
) -> Result<serde_json::Value, String> {
    let doc = state.doc.lock().unwrap();
    stagecut_jobs::export::validate_export_len(doc.content_end()).map_err(|e| e.to_string())?;

    let request = stagecut_jobs::export::ExportRequest {
        document: doc_json(&doc)?,
        width,
        height,
        fps,
    };
    serde_json::to_value(&request).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .manage(AppState {
            doc: std::sync::Mutex::new(Document::default()),
            timeline: std::sync::Mutex::new(TimelineController::new()),
            history: std::sync::Mutex::new(History::new(100)),
            generation: std::sync::Mutex::new(None),
        })
        .invoke_handler(tauri::generate_handler![
            get_document,
            new_document,
            save_document,
            load_document,
            set_lane_layout,
            timeline_pointer_down,
            timeline_pointer_move,
            timeline_pointer_up,
            confirm_replace,
            zoom_in,
            zoom_out,
            get_zoom,
            get_ruler,
            seek,
            play_pause,
            timeline_length,
            get_lanes,
            add_lane,
            remove_lane,
            add_clip_to_lane,
            select_clip,
            clear_selection,
            get_selection,
            delete_selected,
            duplicate_selected,
            can_split,
            split_selected,
            update_clip_property,
            undo,
            redo,
            get_history_state,
            start_generation,
            cancel_generation,
            prepare_export,
        ])
        .setup(|app| {
            let window = app.get_webview_window("main").expect("main window not found");
            tracing::info!("Stagecut window created: {:?}", window.title());
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
