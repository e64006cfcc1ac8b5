//! Castle movement commands and the on-screen button bar.
//!
//! Six named directions map to unit-step translations of the castle group's
//! position. Directions arrive from the six GUI buttons; clicks are resolved
//! against button rectangles in window coordinates before they ever reach
//! the orbit controls.

use cgmath::Vector3;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalPosition;

use crate::{
    data_structures::scene_graph::ContainerNode,
    pipelines::gui::GuiVertex,
    render::Flat,
};

/// How far one command moves the castle.
pub const MOVE_DISTANCE: f32 = 1.0;

/// A named movement direction for the castle group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    Forward,
    Backward,
}

impl Direction {
    /// Parse a direction token. Unknown tokens yield `None`, which callers
    /// treat as a no-op.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "forward" => Some(Self::Forward),
            "backward" => Some(Self::Backward),
            _ => None,
        }
    }

    /// The unit translation for this direction.
    pub fn delta(self) -> Vector3<f32> {
        match self {
            Self::Left => Vector3::new(-1.0, 0.0, 0.0),
            Self::Right => Vector3::new(1.0, 0.0, 0.0),
            Self::Up => Vector3::new(0.0, 1.0, 0.0),
            Self::Down => Vector3::new(0.0, -1.0, 0.0),
            Self::Forward => Vector3::new(0.0, 0.0, -1.0),
            Self::Backward => Vector3::new(0.0, 0.0, 1.0),
        }
    }
}

/// Apply one movement command to the castle group. The translation is always
/// exactly one step; there is no bounds clamping.
pub fn move_castle(castle: &mut ContainerNode, direction: Direction) {
    castle.translate(direction.delta() * MOVE_DISTANCE);
}

/// Apply a raw direction token; unrecognized tokens leave the castle where
/// it is.
pub fn apply_token(castle: &mut ContainerNode, token: &str) {
    if let Some(direction) = Direction::parse(token) {
        move_castle(castle, direction);
    }
}

/// The six movement buttons, named after the controls they replace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonId {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    MoveForward,
    MoveBackward,
}

impl ButtonId {
    pub fn direction(self) -> Direction {
        match self {
            Self::MoveLeft => Direction::Left,
            Self::MoveRight => Direction::Right,
            Self::MoveUp => Direction::Up,
            Self::MoveDown => Direction::Down,
            Self::MoveForward => Direction::Forward,
            Self::MoveBackward => Direction::Backward,
        }
    }
}

/// An axis-aligned rectangle in window coordinates (origin top-left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

const BUTTON_SIZE: f32 = 48.0;
const BUTTON_GAP: f32 = 8.0;
const BUTTON_MARGIN: f32 = 16.0;
const BUTTON_COLOR: [f32; 4] = [0.85, 0.85, 0.85, 0.85];

/// The button grid in the lower-left corner of the window:
///
/// ```text
/// [Forward]  [Up]    [Backward]
/// [Left]     [Down]  [Right]
/// ```
pub fn button_layout(height: u32) -> Vec<(ButtonId, Rect)> {
    use ButtonId::*;
    let grid = [
        [MoveForward, MoveUp, MoveBackward],
        [MoveLeft, MoveDown, MoveRight],
    ];
    let bottom = height as f32 - BUTTON_MARGIN;
    let mut buttons = Vec::with_capacity(6);
    for (row, ids) in grid.iter().enumerate() {
        let y = bottom - (2.0 - row as f32) * BUTTON_SIZE - (1.0 - row as f32) * BUTTON_GAP;
        for (col, id) in ids.iter().enumerate() {
            let x = BUTTON_MARGIN + col as f32 * (BUTTON_SIZE + BUTTON_GAP);
            buttons.push((
                *id,
                Rect {
                    x,
                    y,
                    w: BUTTON_SIZE,
                    h: BUTTON_SIZE,
                },
            ));
        }
    }
    buttons
}

/// GPU-backed button bar: rectangles for hit-testing plus clip-space quads
/// for the GUI pipeline.
pub struct ButtonBar {
    buttons: Vec<(ButtonId, Rect)>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: usize,
}

impl ButtonBar {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let buttons = button_layout(height);
        let (vertex_buffer, index_buffer, num_indices) =
            Self::mk_buffers(device, &buttons, width, height);
        Self {
            buttons,
            vertex_buffer,
            index_buffer,
            num_indices,
        }
    }

    /// Rebuild rectangles and quads for a new window size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.buttons = button_layout(height);
        let (vertex_buffer, index_buffer, num_indices) =
            Self::mk_buffers(device, &self.buttons, width, height);
        self.vertex_buffer = vertex_buffer;
        self.index_buffer = index_buffer;
        self.num_indices = num_indices;
    }

    /// Which button, if any, is under the cursor.
    pub fn hit(&self, position: PhysicalPosition<f64>) -> Option<ButtonId> {
        let (px, py) = (position.x as f32, position.y as f32);
        self.buttons
            .iter()
            .find(|(_, rect)| rect.contains(px, py))
            .map(|(id, _)| *id)
    }

    pub fn render(&self) -> Flat<'_> {
        Flat {
            vertex: &self.vertex_buffer,
            index: &self.index_buffer,
            amount: self.num_indices,
        }
    }

    fn mk_buffers(
        device: &wgpu::Device,
        buttons: &[(ButtonId, Rect)],
        width: u32,
        height: u32,
    ) -> (wgpu::Buffer, wgpu::Buffer, usize) {
        let to_clip = |px: f32, py: f32| {
            [
                px / width as f32 * 2.0 - 1.0,
                1.0 - py / height as f32 * 2.0,
            ]
        };

        let mut vertices: Vec<GuiVertex> = Vec::with_capacity(buttons.len() * 4);
        let mut indices: Vec<u16> = Vec::with_capacity(buttons.len() * 6);
        for (_, rect) in buttons {
            let base = vertices.len() as u16;
            let corners = [
                (rect.x, rect.y + rect.h),
                (rect.x + rect.w, rect.y + rect.h),
                (rect.x + rect.w, rect.y),
                (rect.x, rect.y),
            ];
            for (px, py) in corners {
                vertices.push(GuiVertex {
                    position: to_clip(px, py),
                    color: BUTTON_COLOR,
                });
            }
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Button Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Button Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        (vertex_buffer, index_buffer, indices.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_castle() -> ContainerNode {
        ContainerNode::new()
    }

    #[test]
    fn each_direction_moves_exactly_one_axis_by_one_unit() {
        let cases = [
            (Direction::Left, Vector3::new(-1.0, 0.0, 0.0)),
            (Direction::Right, Vector3::new(1.0, 0.0, 0.0)),
            (Direction::Up, Vector3::new(0.0, 1.0, 0.0)),
            (Direction::Down, Vector3::new(0.0, -1.0, 0.0)),
            (Direction::Forward, Vector3::new(0.0, 0.0, -1.0)),
            (Direction::Backward, Vector3::new(0.0, 0.0, 1.0)),
        ];
        for (direction, expected) in cases {
            let mut castle = origin_castle();
            move_castle(&mut castle, direction);
            assert_eq!(castle.position(), expected, "{direction:?}");
        }
    }

    #[test]
    fn unrecognized_tokens_are_no_ops() {
        let mut castle = origin_castle();
        apply_token(&mut castle, "sideways");
        apply_token(&mut castle, "");
        apply_token(&mut castle, "LEFT");
        assert_eq!(castle.position(), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn moves_compose_additively() {
        let mut castle = origin_castle();
        for _ in 0..3 {
            apply_token(&mut castle, "right");
        }
        for _ in 0..2 {
            apply_token(&mut castle, "up");
        }
        assert_eq!(castle.position(), Vector3::new(3.0, 2.0, 0.0));
    }

    #[test]
    fn left_forward_down_from_origin() {
        let mut castle = origin_castle();
        for token in ["left", "forward", "down"] {
            apply_token(&mut castle, token);
        }
        assert_eq!(castle.position(), Vector3::new(-1.0, -1.0, -1.0));
    }

    #[test]
    fn there_is_no_bounds_clamping() {
        let mut castle = origin_castle();
        for _ in 0..10_000 {
            move_castle(&mut castle, Direction::Up);
        }
        assert_eq!(castle.position().y, 10_000.0);
    }

    #[test]
    fn layout_places_six_disjoint_buttons() {
        let buttons = button_layout(720);
        assert_eq!(buttons.len(), 6);
        for (i, (_, a)) in buttons.iter().enumerate() {
            for (_, b) in buttons.iter().skip(i + 1) {
                let overlap = a.x < b.x + b.w && b.x < a.x + a.w && a.y < b.y + b.h && b.y < a.y + a.h;
                assert!(!overlap);
            }
        }
    }

    #[test]
    fn hits_resolve_to_the_covering_button() {
        let buttons = button_layout(720);
        for (id, rect) in &buttons {
            let center = (rect.x + rect.w / 2.0, rect.y + rect.h / 2.0);
            let covering = buttons
                .iter()
                .find(|(_, r)| r.contains(center.0, center.1))
                .map(|(i, _)| *i);
            assert_eq!(covering, Some(*id));
        }
        // A point far from the grid hits nothing.
        assert!(!buttons.iter().any(|(_, r)| r.contains(700.0, 10.0)));
    }
}
