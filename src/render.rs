use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::engine::local::{
    GOAL_BREADTH, PITCH_BOTTOM_LINE, PITCH_LEFT_LINE, PITCH_LINE_WIDTH, PITCH_RIGHT_LINE,
    PITCH_TOP_LINE, STADIUM_HEIGHT, STADIUM_WIDTH,
};
use crate::error::RenderError;
use crate::model::{Circle, FrameSnapshot, Score, Team};

pub trait Renderer {
    fn draw(&mut self, snapshot: &FrameSnapshot) -> Result<(), RenderError>;
}

const STADIUM_COLOR: &str = "#718C5A";
const PITCH_COLOR: &str = "#619F5E";
const PITCH_LINE_COLOR: &str = "#C7E6BD";
const BALL_COLOR: &str = "#EEEEEE";
const RED_PLAYER_COLOR: &str = "#E56E56";
const BLUE_PLAYER_COLOR: &str = "#5689E5";
const OUTLINE_COLOR: &str = "#000000";
const TEXT_COLOR: &str = "#FFFFFF";
const OUTLINE_WIDTH: f64 = 2.0;

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    /// Sizes the canvas to the stadium and grabs its 2d context.
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, RenderError> {
        canvas.set_width(STADIUM_WIDTH as u32);
        canvas.set_height(STADIUM_HEIGHT as u32);
        let ctx = canvas
            .get_context("2d")?
            .ok_or(RenderError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::ContextUnavailable)?;
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        Ok(Self { ctx })
    }

    fn draw_pitch(&self) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(STADIUM_COLOR);
        ctx.fill_rect(0.0, 0.0, STADIUM_WIDTH, STADIUM_HEIGHT);
        ctx.set_fill_style_str(PITCH_COLOR);
        ctx.fill_rect(
            PITCH_LEFT_LINE,
            PITCH_TOP_LINE,
            PITCH_RIGHT_LINE - PITCH_LEFT_LINE,
            PITCH_BOTTOM_LINE - PITCH_TOP_LINE,
        );

        ctx.set_line_width(PITCH_LINE_WIDTH);
        ctx.set_stroke_style_str(PITCH_LINE_COLOR);
        ctx.set_fill_style_str(PITCH_LINE_COLOR);
        ctx.stroke_rect(
            PITCH_LEFT_LINE,
            PITCH_TOP_LINE,
            PITCH_RIGHT_LINE - PITCH_LEFT_LINE,
            PITCH_BOTTOM_LINE - PITCH_TOP_LINE,
        );

        let half_w = STADIUM_WIDTH / 2.0;
        let half_h = STADIUM_HEIGHT / 2.0;
        ctx.begin_path();
        ctx.arc(half_w, half_h, 8.0, 0.0, 2.0 * PI)?;
        ctx.close_path();
        ctx.fill();

        ctx.begin_path();
        ctx.arc(half_w, half_h, half_h / 3.0, 0.0, 2.0 * PI)?;
        ctx.close_path();
        ctx.stroke();

        ctx.begin_path();
        ctx.move_to(half_w, PITCH_TOP_LINE);
        ctx.line_to(half_w, PITCH_BOTTOM_LINE);
        ctx.stroke();

        // open the goal mouths in the outline
        ctx.set_stroke_style_str(STADIUM_COLOR);
        for x in [PITCH_LEFT_LINE, PITCH_RIGHT_LINE] {
            ctx.begin_path();
            ctx.move_to(x, (STADIUM_HEIGHT - GOAL_BREADTH) / 2.0);
            ctx.line_to(x, (STADIUM_HEIGHT + GOAL_BREADTH) / 2.0);
            ctx.stroke();
        }
        Ok(())
    }

    fn draw_circle(&self, c: &Circle, fill: &str) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        let r = (c.radius - OUTLINE_WIDTH / 2.0).max(0.0);
        ctx.set_fill_style_str(fill);
        ctx.begin_path();
        ctx.arc(c.x, c.y, r, 0.0, 2.0 * PI)?;
        ctx.close_path();
        ctx.fill();
        ctx.set_stroke_style_str(OUTLINE_COLOR);
        ctx.set_line_width(OUTLINE_WIDTH);
        ctx.stroke();
        Ok(())
    }

    fn team_color(red: bool) -> &'static str {
        if red { RED_PLAYER_COLOR } else { BLUE_PLAYER_COLOR }
    }

    fn banner(&self, text: &str, color: &str, y: f64) -> Result<(), RenderError> {
        self.ctx.set_font("bold 42px arial");
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_text(text, STADIUM_WIDTH / 2.0, y)?;
        self.ctx.set_stroke_style_str(OUTLINE_COLOR);
        self.ctx.set_line_width(1.0);
        self.ctx.stroke_text(text, STADIUM_WIDTH / 2.0, y)?;
        Ok(())
    }

    fn draw_score(&self, score: &Score) -> Result<(), RenderError> {
        self.ctx.set_font("bold 24px arial");
        self.ctx.set_fill_style_str(PITCH_LINE_COLOR);
        self.ctx.fill_text(
            &score_line(score),
            STADIUM_WIDTH / 2.0,
            PITCH_TOP_LINE / 2.0,
        )?;
        Ok(())
    }
}

pub fn score_line(score: &Score) -> String {
    format!("{} - {}", score.red, score.blue)
}

/// Headline for a finished match; a draw can only happen with a custom engine.
pub fn winner_text(score: &Score) -> &'static str {
    match score.leader() {
        Some(Team::Red) => "Red Won!",
        Some(Team::Blue) => "Blue Won!",
        None => "Draw!",
    }
}

impl Renderer for CanvasRenderer {
    fn draw(&mut self, snapshot: &FrameSnapshot) -> Result<(), RenderError> {
        self.draw_pitch()?;
        for post in &snapshot.goal_posts {
            self.draw_circle(post, Self::team_color(post.red))?;
        }
        self.draw_score(&snapshot.score)?;
        for player in &snapshot.players {
            self.draw_circle(player, Self::team_color(player.red))?;
            self.ctx.set_font("bold 18px arial");
            self.ctx.set_fill_style_str(TEXT_COLOR);
            self.ctx
                .fill_text(&player.player_number.to_string(), player.x, player.y)?;
        }
        self.draw_circle(&snapshot.ball, BALL_COLOR)?;

        let mid_y = STADIUM_HEIGHT / 2.0;
        if snapshot.game_ended {
            let color = match snapshot.score.leader() {
                Some(Team::Red) => RED_PLAYER_COLOR,
                Some(Team::Blue) => BLUE_PLAYER_COLOR,
                None => TEXT_COLOR,
            };
            self.banner(winner_text(&snapshot.score), color, mid_y - 21.0)?;
            self.banner(&score_line(&snapshot.score), TEXT_COLOR, mid_y + 21.0)?;
        } else if snapshot.red_scored {
            self.banner("Red Scores!", RED_PLAYER_COLOR, mid_y)?;
        } else if snapshot.blue_scored {
            self.banner("Blue Scores!", BLUE_PLAYER_COLOR, mid_y)?;
        }
        Ok(())
    }
}
