use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task, Theme,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trackcore::prelude::AxisConvention;
use trackcore::processing::TrajectoryScene;

const YAW_STEP_DEGREES: f32 = 15.0;
const PITCH_DEGREES: f32 = 30.0;

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Vehicle Track Visualizer".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    form: DiveForm,
    payload: Option<VisualizationPayload>,
    yaw_degrees: f32,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    PayloadFetched(Result<VisualizationPayload, String>),
    FormFieldChanged(FormField, String),
    SubmitDive,
    DiveSubmitted(Result<String, String>),
    RotateLeft,
    RotateRight,
}

#[derive(Debug, Clone, Copy)]
enum FormField {
    Samples,
    Heading,
    TurnRate,
    Speed,
    CruiseDepth,
    SeafloorDepth,
    Seed,
    Description,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                form: DiveForm::default(),
                payload: None,
                yaw_degrees: -45.0,
                status: "Waiting for a trajectory...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_payload(), Message::PayloadFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_payload(), Message::PayloadFetched),
            Message::PayloadFetched(Ok(payload)) => {
                let changed = state
                    .payload
                    .as_ref()
                    .map(|current| current.record_count != payload.record_count)
                    .unwrap_or(true);
                state.status = format!("Trajectory received: {} points", payload.record_count);
                if changed {
                    state.push_history(format!("Trajectory: {} points", payload.record_count));
                }
                state.payload = Some(payload);
                Task::none()
            }
            Message::PayloadFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::FormFieldChanged(field, value) => {
                state.form.update_field(field, value);
                Task::none()
            }
            Message::SubmitDive => {
                let payload = state.form.to_payload();
                Task::perform(post_dive(payload), Message::DiveSubmitted)
            }
            Message::DiveSubmitted(Ok(message)) => {
                state.status = message;
                state.push_history("Dive submitted".into());
                Task::none()
            }
            Message::DiveSubmitted(Err(err)) => {
                state.status = format!("Dive error: {err}");
                Task::none()
            }
            Message::RotateLeft => {
                state.yaw_degrees = (state.yaw_degrees - YAW_STEP_DEGREES).rem_euclid(360.0);
                Task::none()
            }
            Message::RotateRight => {
                state.yaw_degrees = (state.yaw_degrees + YAW_STEP_DEGREES).rem_euclid(360.0);
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let scene = state
            .payload
            .as_ref()
            .and_then(|payload| payload.scene.clone());
        let notes = state
            .payload
            .as_ref()
            .map(|payload| payload.notes.clone())
            .unwrap_or_default();

        let form_column = column![
            text("Synthetic dive").size(26),
            text_input("Samples", &state.form.samples)
                .on_input(|value| Message::FormFieldChanged(FormField::Samples, value))
                .padding(6),
            text_input("Heading (deg)", &state.form.heading)
                .on_input(|value| Message::FormFieldChanged(FormField::Heading, value))
                .padding(6),
            text_input("Turn rate (deg/sample)", &state.form.turn_rate)
                .on_input(|value| Message::FormFieldChanged(FormField::TurnRate, value))
                .padding(6),
            text_input("Speed (m/s)", &state.form.speed)
                .on_input(|value| Message::FormFieldChanged(FormField::Speed, value))
                .padding(6),
            text_input("Cruise depth (m)", &state.form.cruise_depth)
                .on_input(|value| Message::FormFieldChanged(FormField::CruiseDepth, value))
                .padding(6),
            text_input("Seafloor depth (m)", &state.form.seafloor_depth)
                .on_input(|value| Message::FormFieldChanged(FormField::SeafloorDepth, value))
                .padding(6),
            text_input("Seed", &state.form.seed)
                .on_input(|value| Message::FormFieldChanged(FormField::Seed, value))
                .padding(6),
            text_input("Description", &state.form.description)
                .on_input(|value| Message::FormFieldChanged(FormField::Description, value))
                .padding(6),
            button("POST dive").on_press(Message::SubmitDive).padding(10),
            text(&state.status).size(14),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(320.0));

        let summary = if let Some(scene) = &scene {
            text(format!(
                "{}: {} points over {:.1} s",
                scene.title,
                scene.len(),
                scene.duration_seconds
            ))
            .size(18)
        } else {
            text("No trajectory yet").size(18)
        };

        let track_view = Canvas::new(TrackView {
            scene: scene.clone(),
            yaw_degrees: state.yaw_degrees,
        })
        .width(Length::Fill)
        .height(Length::Fixed(360.0));

        let depth_profile = Canvas::new(DepthProfile {
            scene: scene.clone(),
        })
        .width(Length::Fill)
        .height(Length::Fixed(160.0));

        let rotate_row = row![
            button("Rotate left").on_press(Message::RotateLeft).padding(6),
            button("Rotate right").on_press(Message::RotateRight).padding(6),
            text(format!("yaw {:.0} deg", state.yaw_degrees)).size(14),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let notes_list = if notes.is_empty() {
            Column::new().push(text("No notes yet").size(14))
        } else {
            notes
                .iter()
                .fold(Column::new().spacing(4), |col, note| {
                    col.push(text(note.clone()).size(14))
                })
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let track_column = column![
            text("Trajectory").size(26),
            summary,
            track_view,
            rotate_row,
            text("Depth profile (elapsed time vs depth)").size(16),
            depth_profile,
            text("Run notes").size(16),
            Container::new(scrollable(notes_list).height(Length::Fixed(90.0))).padding(6),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![form_column, track_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

async fn fetch_payload() -> Result<VisualizationPayload, String> {
    let response = reqwest::get("http://127.0.0.1:9000/payload")
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<VisualizationPayload>()
        .await
        .map_err(|e| e.to_string())
}

async fn post_dive(config: DiveRequest) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post("http://127.0.0.1:9000/ingest-config")
        .json(&config)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok("Dive submitted".into())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_else(|_| "".into());
        Err(format!("{}: {}", status, text))
    }
}

#[derive(Debug, Clone)]
struct DiveForm {
    samples: String,
    heading: String,
    turn_rate: String,
    speed: String,
    cruise_depth: String,
    seafloor_depth: String,
    seed: String,
    description: String,
}

impl DiveForm {
    fn default() -> Self {
        Self {
            samples: "240".into(),
            heading: "30".into(),
            turn_rate: "1.5".into(),
            speed: "1.5".into(),
            cruise_depth: "25".into(),
            seafloor_depth: "40".into(),
            seed: "7".into(),
            description: "Visualizer survey leg".into(),
        }
    }

    fn update_field(&mut self, field: FormField, value: String) {
        match field {
            FormField::Samples => self.samples = value,
            FormField::Heading => self.heading = value,
            FormField::TurnRate => self.turn_rate = value,
            FormField::Speed => self.speed = value,
            FormField::CruiseDepth => self.cruise_depth = value,
            FormField::SeafloorDepth => self.seafloor_depth = value,
            FormField::Seed => self.seed = value,
            FormField::Description => self.description = value,
        }
    }

    fn to_payload(&self) -> DiveRequest {
        DiveRequest {
            samples: self.samples.parse().ok(),
            heading_degrees: self.heading.parse().ok(),
            turn_rate_degrees: self.turn_rate.parse().ok(),
            speed_mps: self.speed.parse().ok(),
            cruise_depth: self.cruise_depth.parse().ok(),
            seafloor_depth: self.seafloor_depth.parse().ok(),
            seed: self.seed.parse().ok(),
            description: if self.description.trim().is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
        }
    }
}

/// Partial dive config; the bridge fills anything missing with defaults.
#[derive(Debug, Serialize)]
struct DiveRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    heading_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    turn_rate_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed_mps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cruise_depth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seafloor_depth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct VisualizationPayload {
    #[serde(default)]
    scene: Option<TrajectoryScene>,
    #[serde(default)]
    record_count: usize,
    #[serde(default)]
    notes: Vec<String>,
}

/// Converts a frame position into (east, north, up).
fn to_enu(convention: AxisConvention, position: [f64; 3]) -> [f32; 3] {
    match convention {
        AxisConvention::EngineYUp => [position[0] as f32, position[2] as f32, position[1] as f32],
        AxisConvention::NorthEastDown => {
            [position[1] as f32, position[0] as f32, -position[2] as f32]
        }
    }
}

/// Orthographic view: yaw about the vertical, then a fixed downward pitch.
fn view_project(enu: [f32; 3], yaw_degrees: f32) -> (f32, f32) {
    let (sin_yaw, cos_yaw) = yaw_degrees.to_radians().sin_cos();
    let (sin_pitch, cos_pitch) = PITCH_DEGREES.to_radians().sin_cos();
    let across = enu[0] * cos_yaw - enu[1] * sin_yaw;
    let along = enu[0] * sin_yaw + enu[1] * cos_yaw;
    (across, -(along * sin_pitch + enu[2] * cos_pitch))
}

/// Three-stop ramp from deep blue through teal to yellow.
fn time_color(fraction: f64) -> Color {
    let t = fraction.clamp(0.0, 1.0) as f32;
    let (from, to, local) = if t < 0.5 {
        ((0.27, 0.0, 0.33), (0.13, 0.57, 0.55), t * 2.0)
    } else {
        ((0.13, 0.57, 0.55), (0.99, 0.91, 0.14), (t - 0.5) * 2.0)
    };
    Color::from_rgb(
        from.0 + (to.0 - from.0) * local,
        from.1 + (to.1 - from.1) * local,
        from.2 + (to.2 - from.2) * local,
    )
}

struct ScreenMapper {
    min: (f32, f32),
    scale: (f32, f32),
    offset: (f32, f32),
}

impl ScreenMapper {
    /// Same scale on both axes, centred in the bounds.
    fn fit(points: &[(f32, f32)], bounds: Rectangle, margin: f32) -> Self {
        let mut mapper = Self::stretch(points, bounds, margin);
        let (span_x, span_y) = mapper.spans(points);
        let uniform = mapper.scale.0.min(mapper.scale.1);
        let usable_w = (bounds.width - 2.0 * margin).max(1.0);
        let usable_h = (bounds.height - 2.0 * margin).max(1.0);
        mapper.scale = (uniform, uniform);
        mapper.offset = (
            margin + (usable_w - span_x * uniform) / 2.0,
            margin + (usable_h - span_y * uniform) / 2.0,
        );
        mapper
    }

    /// Independent scales so the data fills the bounds.
    fn stretch(points: &[(f32, f32)], bounds: Rectangle, margin: f32) -> Self {
        let (min_x, min_y) = points.iter().fold(
            (f32::INFINITY, f32::INFINITY),
            |(mx, my), &(x, y)| (mx.min(x), my.min(y)),
        );
        let mut mapper = Self {
            min: (min_x, min_y),
            scale: (1.0, 1.0),
            offset: (margin, margin),
        };
        let (span_x, span_y) = mapper.spans(points);
        let usable_w = (bounds.width - 2.0 * margin).max(1.0);
        let usable_h = (bounds.height - 2.0 * margin).max(1.0);
        mapper.scale = (usable_w / span_x, usable_h / span_y);
        mapper
    }

    fn spans(&self, points: &[(f32, f32)]) -> (f32, f32) {
        let (max_x, max_y) = points.iter().fold(
            (f32::NEG_INFINITY, f32::NEG_INFINITY),
            |(mx, my), &(x, y)| (mx.max(x), my.max(y)),
        );
        ((max_x - self.min.0).max(1e-3), (max_y - self.min.1).max(1e-3))
    }

    fn map(&self, point: (f32, f32)) -> Point {
        Point::new(
            self.offset.0 + (point.0 - self.min.0) * self.scale.0,
            self.offset.1 + (point.1 - self.min.1) * self.scale.1,
        )
    }
}

#[derive(Clone)]
struct TrackView {
    scene: Option<TrajectoryScene>,
    yaw_degrees: f32,
}

impl canvas::Program<Message> for TrackView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.02, 0.03, 0.06),
        );

        let Some(scene) = &self.scene else {
            return vec![frame.into_geometry()];
        };
        let convention = scene.axis_convention;
        let project = |position: [f64; 3]| view_project(to_enu(convention, position), self.yaw_degrees);

        let path_points = scene
            .path
            .iter()
            .map(|point| project(point.position))
            .collect::<Vec<_>>();
        let marker_points = scene
            .markers
            .iter()
            .map(|marker| (project(marker.start), project(marker.end)))
            .collect::<Vec<_>>();

        let mut extent = path_points.clone();
        extent.extend(marker_points.iter().map(|(_, end)| *end));
        if extent.is_empty() {
            return vec![frame.into_geometry()];
        }
        let mapper = ScreenMapper::fit(&extent, bounds, 16.0);

        for (start, end) in &marker_points {
            let segment = Path::line(mapper.map(*start), mapper.map(*end));
            frame.stroke(
                &segment,
                Stroke::default()
                    .with_width(1.0)
                    .with_color(Color::from_rgb(0.55, 0.35, 0.2)),
            );
        }

        for (pair, points) in path_points.windows(2).zip(scene.path.windows(2)) {
            let segment = Path::line(mapper.map(pair[0]), mapper.map(pair[1]));
            frame.stroke(
                &segment,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(time_color(points[1].time_fraction)),
            );
        }

        for (screen, point) in path_points.iter().zip(&scene.path) {
            let marker = Path::new(|builder| builder.circle(mapper.map(*screen), 2.5));
            frame.fill(&marker, time_color(point.time_fraction));
        }

        vec![frame.into_geometry()]
    }
}

#[derive(Clone)]
struct DepthProfile {
    scene: Option<TrajectoryScene>,
}

impl canvas::Program<Message> for DepthProfile {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        if let Some(scene) = self.scene.as_ref().filter(|scene| scene.len() > 1) {
            let (axis, sign) = scene.axis_convention.depth_axis();
            let samples = scene
                .path
                .iter()
                .map(|point| (point.elapsed_seconds as f32, (point.position[axis] * sign) as f32))
                .collect::<Vec<_>>();
            let mapper = ScreenMapper::stretch(&samples, bounds, 8.0);
            let path = Path::new(|builder| {
                for (i, sample) in samples.iter().enumerate() {
                    if i == 0 {
                        builder.move_to(mapper.map(*sample));
                    } else {
                        builder.line_to(mapper.map(*sample));
                    }
                }
            });

            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(2.5)
                    .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
            );
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_frames_map_depth_to_negative_up() {
        assert_eq!(
            to_enu(AxisConvention::EngineYUp, [1.0, -30.0, 2.0]),
            [1.0, 2.0, -30.0]
        );
        assert_eq!(
            to_enu(AxisConvention::NorthEastDown, [2.0, 1.0, 30.0]),
            [1.0, 2.0, -30.0]
        );
    }

    #[test]
    fn deeper_points_draw_lower_on_screen() {
        let (_, shallow) = view_project([0.0, 0.0, -5.0], 0.0);
        let (_, deep) = view_project([0.0, 0.0, -50.0], 0.0);
        assert!(deep > shallow);
    }

    #[test]
    fn time_ramp_spans_blue_to_yellow() {
        let start = time_color(0.0);
        let end = time_color(1.0);
        assert!(start.b > start.r);
        assert!(end.r > end.b);
    }

    #[test]
    fn payload_without_scene_deserializes() {
        let payload: VisualizationPayload =
            serde_json::from_str(r#"{"scene":null,"record_count":0,"notes":[]}"#).unwrap();
        assert!(payload.scene.is_none());
        let empty: VisualizationPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.record_count, 0);
    }
}
