//! Walker engine: the three state transitions.
//!
//! Every function here assumes the caller holds the canvas write lock for
//! the whole call. None of them can fail.

use rand::Rng;

use crate::canvas::{CanvasState, Direction, Position, Rgb};

/// What a refresh tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Walker advanced and painted the pixel at this position.
    Moved(Position),
    /// Next position was off the canvas; walker stayed put and now heads this way.
    Bounced(Direction),
}

/// Advance one pixel, or reverse direction at the edge without painting.
pub fn step(canvas: &mut CanvasState) -> StepOutcome {
    if let Some(next) = next_position(canvas) {
        canvas.position = next;
        canvas.bitmap.put_pixel(next.x, next.y, canvas.color.opaque());
        StepOutcome::Moved(next)
    } else {
        canvas.direction = canvas.direction.reversed();
        StepOutcome::Bounced(canvas.direction)
    }
}

/// Click transition: random visible color plus a perpendicular turn.
pub fn randomize_manual<R: Rng>(canvas: &mut CanvasState, rng: &mut R) {
    let raw = Rgb([rng.random(), rng.random(), rng.random()]);
    canvas.color = raw.visible();
    turn(canvas, rng);
}

/// Auto-timer transition: perpendicular turn, color unchanged.
pub fn randomize_auto<R: Rng>(canvas: &mut CanvasState, rng: &mut R) {
    turn(canvas, rng);
}

fn turn<R: Rng>(canvas: &mut CanvasState, rng: &mut R) {
    canvas.direction = canvas.direction.perpendicular(rng.random_bool(0.5));
}

fn next_position(canvas: &CanvasState) -> Option<Position> {
    let Position { x, y } = canvas.position;
    let (width, height) = canvas.bitmap.dimensions();
    match canvas.direction {
        Direction::Up => y.checked_sub(1).map(|y| Position::new(x, y)),
        Direction::Down => (y + 1 < height).then(|| Position::new(x, y + 1)),
        Direction::Left => x.checked_sub(1).map(|x| Position::new(x, y)),
        Direction::Right => (x + 1 < width).then(|| Position::new(x + 1, y)),
    }
}

#[cfg(test)]
#[path = "walker_test.rs"]
mod tests;
