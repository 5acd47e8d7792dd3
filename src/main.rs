use clap::Parser;
use ggez::{
    event,
    graphics::{self, Color, DrawMode, Mesh, Rect},
    input::keyboard::{KeyCode, KeyInput},
    Context, GameError, GameResult,
};
use petri_dish::{Arena, Role, SimConfig, Simulation};
use std::path::PathBuf;
use tracing::info;

//////////////////////////////////////////////////////////////////////////////
// Viewer Constants
//////////////////////////////////////////////////////////////////////////////

/// Pixels left free around the dish along the shorter window side
const ARENA_MARGIN: f64 = 100.0;
/// Opacity of every life form
const BODY_ALPHA: u8 = 127;
/// Prey palette, indexed by each prey's shade
const PREY_PALETTE: [(u8, u8, u8); 10] = [
    (0x99, 0xe2, 0xb4),
    (0x88, 0xd4, 0xab),
    (0x78, 0xc6, 0xa3),
    (0x67, 0xb9, 0x9a),
    (0x56, 0xab, 0x91),
    (0x46, 0x9d, 0x89),
    (0x35, 0x8f, 0x80),
    (0x24, 0x82, 0x77),
    (0x14, 0x74, 0x6f),
    (0x03, 0x66, 0x66),
];
const PREDATOR_RANGE: (u32, u32) = (1, 10);
const MIN_POPULATION: u32 = 10;
const SPEED_RANGE: (f64, f64) = (1.0, 50.0);
const REACTION_RANGE: (f64, f64) = (100.0, 500.0);

#[derive(Parser, Debug)]
#[command(name = "petri-dish", about = "Predator and prey life forms in a petri dish")]
struct Args {
    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the simulation RNG
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    #[arg(long, default_value_t = 900.0)]
    height: f32,
}

//////////////////////////////////////////////////////////////////////////////
// Control Panel
//////////////////////////////////////////////////////////////////////////////

/// Keyboard-driven stand-in for sliders; fed to the engine every frame.
#[derive(Clone, Copy, Debug)]
struct Panel {
    population: u32,
    max_population: u32,
    predators: u32,
    speed: f64,
    reaction: f64,
    paused: bool,
}

impl Panel {
    fn from_config(config: &SimConfig) -> Self {
        let max_population = config.population.max_population.max(MIN_POPULATION);
        Panel {
            population: config.population.target.clamp(MIN_POPULATION, max_population),
            max_population,
            predators: config
                .population
                .predators
                .clamp(PREDATOR_RANGE.0, PREDATOR_RANGE.1),
            speed: config.motion.speed_factor.clamp(SPEED_RANGE.0, SPEED_RANGE.1),
            reaction: config
                .interaction
                .prey_reaction_distance
                .clamp(REACTION_RANGE.0, REACTION_RANGE.1),
            paused: false,
        }
    }

    fn adjust_population(&mut self, delta: i64) {
        let next = i64::from(self.population) + delta;
        self.population =
            next.clamp(i64::from(MIN_POPULATION), i64::from(self.max_population)) as u32;
    }

    fn adjust_predators(&mut self, delta: i64) {
        let next = i64::from(self.predators) + delta;
        self.predators =
            next.clamp(i64::from(PREDATOR_RANGE.0), i64::from(PREDATOR_RANGE.1)) as u32;
    }

    fn adjust_speed(&mut self, delta: f64) {
        self.speed = (self.speed + delta).clamp(SPEED_RANGE.0, SPEED_RANGE.1);
    }

    fn adjust_reaction(&mut self, delta: f64) {
        self.reaction = (self.reaction + delta).clamp(REACTION_RANGE.0, REACTION_RANGE.1);
    }
}

//////////////////////////////////////////////////////////////////////////////
// Game State Implementation
//////////////////////////////////////////////////////////////////////////////

/// Owns the simulation and the panel driving it
struct GameState {
    sim: Simulation,
    panel: Panel,
}

impl GameState {
    fn new(config: SimConfig, arena: Arena) -> GameResult<GameState> {
        let panel = Panel::from_config(&config);
        let sim = Simulation::new(config, arena)
            .map_err(|e| GameError::CustomError(e.to_string()))?;
        Ok(GameState { sim, panel })
    }

    fn body_color(role: Role, is_target: bool, shade: u8) -> Color {
        match role {
            Role::Predator => Color::from_rgba(255, 107, 107, BODY_ALPHA),
            Role::Prey if is_target => Color::from_rgba(255, 230, 109, BODY_ALPHA),
            Role::Prey => {
                let (r, g, b) = PREY_PALETTE[shade as usize % PREY_PALETTE.len()];
                Color::from_rgba(r, g, b, BODY_ALPHA)
            }
        }
    }
}

impl event::EventHandler<GameError> for GameState {
    fn update(&mut self, ctx: &mut Context) -> GameResult {
        let p = self.panel;
        self.sim
            .configure(p.population, p.predators, p.speed, p.reaction, p.paused);
        self.sim.tick(ctx.time.delta().as_secs_f64() * 1000.0);
        Ok(())
    }

    fn key_down_event(
        &mut self,
        ctx: &mut Context,
        input: KeyInput,
        _repeated: bool,
    ) -> GameResult {
        match input.keycode {
            Some(KeyCode::Space) => self.panel.paused = !self.panel.paused,
            Some(KeyCode::R) => self.sim.reset(self.panel.population, self.panel.predators),
            Some(KeyCode::Up) => self.panel.adjust_population(10),
            Some(KeyCode::Down) => self.panel.adjust_population(-10),
            Some(KeyCode::Right) => self.panel.adjust_speed(1.0),
            Some(KeyCode::Left) => self.panel.adjust_speed(-1.0),
            Some(KeyCode::Period) => self.panel.adjust_predators(1),
            Some(KeyCode::Comma) => self.panel.adjust_predators(-1),
            Some(KeyCode::RBracket) => self.panel.adjust_reaction(10.0),
            Some(KeyCode::LBracket) => self.panel.adjust_reaction(-10.0),
            Some(KeyCode::Escape) => ctx.request_quit(),
            _ => {}
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult {
        let mut canvas = graphics::Canvas::from_frame(ctx, Color::from_rgb(0x29, 0x29, 0x29));

        let arena = *self.sim.arena();
        if arena.radius > 0.0 {
            let dish = Mesh::new_circle(
                ctx,
                DrawMode::fill(),
                [arena.center.x as f32, arena.center.y as f32],
                arena.radius as f32,
                0.5,
                Color::from_rgb(0x33, 0x33, 0x33),
            )?;
            canvas.draw(&dish, graphics::DrawParam::default());
        }

        for view in self.sim.snapshot() {
            let body = Mesh::new_circle(
                ctx,
                DrawMode::fill(),
                [view.position.x as f32, view.position.y as f32],
                view.radius.max(0.5) as f32,
                0.1,
                Self::body_color(view.role, view.is_target, view.shade),
            )?;
            canvas.draw(&body, graphics::DrawParam::default());
        }

        // Control panel
        let text_color = Color::from_rgb(0xc6, 0xc6, 0xc6);
        let panel_bg = Mesh::new_rectangle(
            ctx,
            DrawMode::fill(),
            Rect::new(5.0, 5.0, 260.0, 190.0),
            Color::new(0.1, 0.1, 0.1, 0.6),
        )?;
        canvas.draw(&panel_bg, graphics::DrawParam::default());

        let p = self.panel;
        let board = self.sim.scoreboard();
        let lines = [
            "Petri Dish".to_string(),
            format!("Life forms: {}  (Up/Down)", p.population),
            format!("Predators: {}  (, / .)", p.predators),
            format!("Speed: {}  (Left/Right)", p.speed),
            format!("Prey reaction: {}  ([ / ])", p.reaction),
            format!(
                "{}  (Space)   Reset (R)",
                if p.paused { "Stopped" } else { "Running" }
            ),
            format!(
                "Predators {} / Prey {} / Kills {}",
                board.predator_count, board.prey_count, board.total_kills
            ),
        ];
        for (i, line) in lines.iter().enumerate() {
            canvas.draw(
                &graphics::Text::new(line.as_str()),
                graphics::DrawParam::default()
                    .dest([15.0, 15.0 + i as f32 * 24.0])
                    .color(text_color),
            );
        }

        // Kill feed
        let now = self.sim.clock().elapsed_ms();
        let feed_start_y = 210.0;
        for (i, kill) in board.kill_feed.iter().enumerate() {
            let eater = match kill.eater_role {
                Role::Predator => "Predator",
                Role::Prey => "Prey",
            };
            let kill_text = graphics::Text::new(format!(
                "{} {} -> Prey {}",
                eater, kill.eater, kill.eaten
            ));
            canvas.draw(
                &kill_text,
                graphics::DrawParam::default()
                    .dest([15.0, feed_start_y + i as f32 * 22.0])
                    .color(Color::new(1.0, 1.0, 1.0, kill.alpha(now))),
            );
        }

        let (_, height) = ctx.gfx.drawable_size();
        canvas.draw(
            &graphics::Text::new(format!("FPS: {:.2}", ctx.time.fps())),
            graphics::DrawParam::default()
                .dest([10.0, height - 24.0])
                .color(text_color),
        );

        canvas.finish(ctx)?;
        Ok(())
    }
}

//////////////////////////////////////////////////////////////////////////////
// Main Function
//////////////////////////////////////////////////////////////////////////////

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> GameResult {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            SimConfig::from_file(path).map_err(|e| GameError::CustomError(e.to_string()))?
        }
        None => SimConfig::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }

    let arena = Arena::fit_viewport(f64::from(args.width), f64::from(args.height), ARENA_MARGIN);
    let state = GameState::new(config, arena)?;
    info!(
        width = args.width,
        height = args.height,
        radius = arena.radius,
        "opening petri dish"
    );

    let cb = ggez::ContextBuilder::new("petri_dish", "petri-dish")
        .window_setup(ggez::conf::WindowSetup::default().title("Petri Dish"))
        .window_mode(ggez::conf::WindowMode::default().dimensions(args.width, args.height));

    let (ctx, event_loop) = cb.build()?;
    event::run(ctx, event_loop, state)
}
