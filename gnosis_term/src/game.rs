//! Text front end: command parsing, the active game and its rendering.

use std::fmt::Write as _;

use gnosis::quiz::{Answer, QuizSession};
use gnosis::selection::Toggle;
use gnosis::soup::{Outcome, Session, SoupSnapshot, Variant};
use gnosis::stars::{self, KeyValueStore};
use gnosis::{quiz::AgeGroup, CellRef, Difficulty, Prng};
use tracing::{info, warn};

use crate::error::AppError;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Soup(Variant),
    Quiz(AgeGroup),
    /// Zero-based coordinates.
    Toggle(CellRef),
    Evaluate,
    Clear,
    Hint,
    Restart,
    Stars,
    Show,
    Help,
    Quit,
    Answer(i32),
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Show);
    };
    let head = head.to_lowercase();

    if let Ok(n) = head.parse::<i32>() {
        return Ok(Command::Answer(n));
    }

    match head.as_str() {
        "sopa" => match words.next().map(|w| w.to_lowercase()).as_deref() {
            Some("suma") | Some("sumas") => Ok(Command::Soup(Variant::PairAddition)),
            Some("resta") | Some("restas") => Ok(Command::Soup(Variant::PairSubtraction)),
            Some(other) => Difficulty::from_name(other)
                .map(|d| Command::Soup(Variant::Advanced(d)))
                .ok_or_else(|| format!("Sopa desconocida: {other}")),
            None => Ok(Command::Soup(Variant::PairAddition)),
        },
        "quiz" => {
            let label = words.next().unwrap_or("6-8");
            AgeGroup::from_label(label)
                .map(Command::Quiz)
                .ok_or_else(|| format!("Edad desconocida: {label} (usa 3-5, 6-8 o 9-11)"))
        }
        "t" => {
            let row = parse_coord(words.next())?;
            let col = parse_coord(words.next())?;
            Ok(Command::Toggle(CellRef::new(row, col)))
        }
        "v" => Ok(Command::Evaluate),
        "l" => Ok(Command::Clear),
        "pista" => Ok(Command::Hint),
        "r" => Ok(Command::Restart),
        "estrellas" => Ok(Command::Stars),
        "ver" => Ok(Command::Show),
        "ayuda" | "?" => Ok(Command::Help),
        "salir" | "q" => Ok(Command::Quit),
        other => Err(format!("Comando desconocido: {other} (escribe ayuda)")),
    }
}

/// One-based on screen, zero-based inside.
fn parse_coord(word: Option<&str>) -> Result<u8, String> {
    let word = word.ok_or_else(|| "Uso: t <fila> <columna>".to_string())?;
    match word.parse::<u8>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Coordenada inválida: {word}")),
    }
}

pub const HELP: &str = "\
Juegos:
  sopa suma | sopa resta         Sopa de 2 números
  sopa facil | medio | dificil   Sopa avanzada (2 a 4 números)
  quiz 3-5 | 6-8 | 9-11          Preguntas de matemáticas
En la sopa:
  t <fila> <col>   Seleccionar / quitar número
  v                Verificar
  l                Limpiar selección
  pista            Mostrar una combinación
  r                Nueva sopa
En el quiz: escribe el número de tu respuesta.
  estrellas        Ver tus estrellas
  salir            Guardar y salir";

#[derive(Debug)]
enum ActiveGame {
    Soup { variant: Variant, session: Session },
    Quiz(QuizSession),
}

pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

pub struct App {
    settings: Settings,
    rng: Prng,
    store: Box<dyn KeyValueStore>,
    game: Option<ActiveGame>,
}

impl App {
    pub fn new(settings: Settings, seed: u64, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            settings,
            rng: Prng::new(seed),
            store,
            game: None,
        }
    }

    /// Apply one command. A store that cannot be written never blocks play:
    /// the failure is reported in the reply and the command still runs.
    pub fn handle(&mut self, cmd: Command) -> Reply {
        match cmd {
            Command::Soup(variant) => {
                let note = self.settle_note();
                let session = Session::new(self.settings.soup_config(variant), &mut self.rng);
                info!(variant = variant.name(), "soup started");
                self.game = Some(ActiveGame::Soup { variant, session });
                Reply::say(format!("{note}{}", self.render()))
            }
            Command::Quiz(age) => {
                let note = self.settle_note();
                let quiz = QuizSession::new(age, self.settings.quiz_rounds, &mut self.rng);
                info!(age = age.label(), "quiz started");
                self.game = Some(ActiveGame::Quiz(quiz));
                Reply::say(format!("{note}{}", self.render()))
            }
            Command::Toggle(cell) => match &mut self.game {
                Some(ActiveGame::Soup { session, .. }) => {
                    let note = match session.toggle(cell) {
                        Toggle::Selected | Toggle::Deselected => "",
                        Toggle::Full => "Ya elegiste el máximo de números.\n",
                        Toggle::Consumed => "Ese número ya forma parte de una combinación.\n",
                        Toggle::OutOfBounds => "Esa casilla no existe.\n",
                        Toggle::Finished => "La sopa está completa. Escribe r para otra.\n",
                    };
                    Reply::say(format!("{note}{}", self.render()))
                }
                _ => Reply::say("Primero empieza una sopa (sopa suma)."),
            },
            Command::Evaluate => match &mut self.game {
                Some(ActiveGame::Soup { session, .. }) => {
                    let note = match session.evaluate() {
                        Outcome::Credited {
                            completed: true, ..
                        } => format!(
                            "¡Sopa Completada! Ganaste {} estrellas ⭐\n",
                            session.stars_earned()
                        ),
                        Outcome::Credited { aggregate, .. } => {
                            format!("¡Correcto! {aggregate} ⭐\n")
                        }
                        Outcome::AlreadyFound { .. } => "Ya encontraste esa combinación.\n".into(),
                        Outcome::Mismatch { aggregate } => {
                            format!("Da {aggregate}, no {}. ¡Intenta otra vez!\n", session.target())
                        }
                        Outcome::Incomplete => "Selecciona al menos 2 números.\n".into(),
                        Outcome::Finished => "La sopa está completa. Escribe r para otra.\n".into(),
                    };
                    let stuck = if session.is_stuck() {
                        "No quedan combinaciones. Escribe r para una sopa nueva.\n"
                    } else {
                        ""
                    };
                    Reply::say(format!("{note}{stuck}{}", self.render()))
                }
                _ => Reply::say("Primero empieza una sopa (sopa suma)."),
            },
            Command::Clear => {
                if let Some(ActiveGame::Soup { session, .. }) = &mut self.game {
                    session.clear_selection();
                }
                Reply::say(self.render())
            }
            Command::Hint => match &self.game {
                Some(ActiveGame::Soup { session, .. }) => match session.hint() {
                    Some(key) => {
                        let cells: Vec<String> = key
                            .cells()
                            .iter()
                            .map(|c| format!("({}, {})", c.row + 1, c.col + 1))
                            .collect();
                        Reply::say(format!("Prueba con {}", cells.join(" ")))
                    }
                    None => Reply::say("No quedan combinaciones."),
                },
                _ => Reply::say("Las pistas son solo para la sopa."),
            },
            Command::Restart => {
                let note = self.settle_note();
                match &mut self.game {
                    Some(ActiveGame::Soup { session, .. }) => session.reset(&mut self.rng),
                    Some(ActiveGame::Quiz(quiz)) => {
                        *quiz = QuizSession::new(quiz.age(), self.settings.quiz_rounds, &mut self.rng)
                    }
                    None => {}
                }
                Reply::say(format!("{note}{}", self.render()))
            }
            Command::Stars => {
                let balance = stars::star_balance(&*self.store);
                Reply::say(format!("Tienes {balance} estrellas ⭐"))
            }
            Command::Show => Reply::say(self.render()),
            Command::Help => Reply::say(HELP),
            Command::Answer(n) => match &mut self.game {
                Some(ActiveGame::Quiz(quiz)) => {
                    let note = match quiz.answer(n, &mut self.rng) {
                        Answer::Correct if quiz.is_finished() => format!(
                            "¡Correcto! Terminaste: ganaste {} estrellas ⭐\n",
                            quiz.stars_earned()
                        ),
                        Answer::Correct => "¡Correcto! +10\n".to_string(),
                        Answer::Incorrect => "Casi... ¡intenta otra vez!\n".to_string(),
                        Answer::Finished => "Quiz terminado. Escribe r para jugar otra vez.\n".to_string(),
                    };
                    Reply::say(format!("{note}{}", self.render()))
                }
                _ => Reply::say("Escribe números solo durante un quiz."),
            },
            Command::Quit => {
                let text = match self.settle() {
                    Ok(balance) => format!("¡Hasta pronto! Tienes {balance} estrellas ⭐"),
                    Err(e) => {
                        warn!("Could not save stars on quit: {}", e);
                        format!("No se pudieron guardar las estrellas: {e}\n¡Hasta pronto!")
                    }
                };
                Reply { text, quit: true }
            }
        }
    }

    /// Settle the active game; empty on success, a warning line otherwise.
    fn settle_note(&mut self) -> String {
        match self.settle() {
            Ok(_) => String::new(),
            Err(e) => {
                warn!("Could not save stars: {}", e);
                format!("No se pudieron guardar las estrellas: {e}\n")
            }
        }
    }

    /// Deposit whatever the active game has earned and not yet deposited.
    fn settle(&mut self) -> Result<u64, AppError> {
        let balance = match &mut self.game {
            Some(ActiveGame::Soup { session, .. }) => session.settle(&mut *self.store)?,
            Some(ActiveGame::Quiz(quiz)) => quiz.settle(&mut *self.store)?,
            None => stars::star_balance(&*self.store),
        };
        Ok(balance)
    }

    pub fn render(&self) -> String {
        match &self.game {
            None => format!("Gnosis\n{HELP}"),
            Some(ActiveGame::Soup { variant, session }) => render_soup(*variant, &session.snapshot()),
            Some(ActiveGame::Quiz(quiz)) => render_quiz(quiz),
        }
    }
}

fn render_soup(variant: Variant, snap: &SoupSnapshot) -> String {
    let title = match variant {
        Variant::PairAddition => "Sopa de Sumas".to_string(),
        Variant::PairSubtraction => "Sopa de Restas".to_string(),
        Variant::Advanced(d) => format!("Sopa Avanzada ({})", d.name()),
    };
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(
        out,
        "Encuentra {} combinaciones que den {}   [{} / {}]  ⭐ {}",
        snap.goal, snap.target, snap.score, snap.goal, snap.points
    );

    let size = snap.size as usize;
    out.push_str("    ");
    for col in 1..=size {
        let _ = write!(out, "{col:>4}");
    }
    out.push('\n');
    for row in 0..size {
        let _ = write!(out, "{:>3} ", row + 1);
        for col in 0..size {
            let i = row * size + col;
            let v = snap.values[i];
            let cell = CellRef::new(row as u8, col as u8);
            if snap.selected.contains(&cell) {
                let _ = write!(out, "[{v:>2}]");
            } else if snap.consumed[i] {
                let _ = write!(out, "({v:>2})");
            } else {
                let _ = write!(out, " {v:>2} ");
            }
        }
        out.push('\n');
    }

    if !snap.selected.is_empty() {
        let values: Vec<String> = snap
            .selected
            .iter()
            .map(|c| snap.values[c.row as usize * size + c.col as usize].to_string())
            .collect();
        let current = snap
            .current
            .map(|v| v.to_string())
            .unwrap_or_else(|| "?".to_string());
        let _ = writeln!(out, "Seleccionados: {}  →  {}", values.join(", "), current);
    }
    out
}

fn render_quiz(quiz: &QuizSession) -> String {
    let q = quiz.question();
    let opts: Vec<String> = q.options.iter().map(|o| o.to_string()).collect();
    format!(
        "Quiz {}  ⭐ {}  (aciertos {})\n¿Cuánto es {}?\nOpciones: {}",
        quiz.age().label(),
        quiz.points(),
        quiz.answered(),
        q.prompt(),
        opts.join("   ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnosis::error::StoreError;
    use gnosis::stars::{KeyValueStore, MemoryStore, STARS_KEY};

    /// Reads work, every write fails.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            Some("3".to_string())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    fn credit_one_pair(app: &mut App) {
        let key = match &app.game {
            Some(ActiveGame::Soup { session, .. }) => session.hint().unwrap(),
            _ => unreachable!(),
        };
        for &c in key.cells() {
            app.handle(Command::Toggle(c));
        }
        app.handle(Command::Evaluate);
    }

    fn app() -> App {
        App::new(Settings::default(), 77, Box::new(MemoryStore::default()))
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("sopa resta"), Ok(Command::Soup(Variant::PairSubtraction)));
        assert_eq!(
            parse_command("sopa dificil"),
            Ok(Command::Soup(Variant::Advanced(Difficulty::Hard)))
        );
        assert_eq!(parse_command("t 1 6"), Ok(Command::Toggle(CellRef::new(0, 5))));
        assert_eq!(parse_command("  "), Ok(Command::Show));
        assert_eq!(parse_command("-3"), Ok(Command::Answer(-3)));
        assert_eq!(parse_command("quiz 9-11"), Ok(Command::Quiz(AgeGroup::Middle)));
        assert!(parse_command("t 0 1").is_err());
        assert!(parse_command("t 1").is_err());
        assert!(parse_command("bailar").is_err());
    }

    #[test]
    fn soup_round_trip_through_commands() {
        let mut app = app();
        app.handle(Command::Soup(Variant::PairAddition));

        let key = match &app.game {
            Some(ActiveGame::Soup { session, .. }) => session.hint().unwrap(),
            _ => unreachable!(),
        };
        for &c in key.cells() {
            app.handle(Command::Toggle(c));
        }
        let reply = app.handle(Command::Evaluate);
        assert!(reply.text.contains("¡Correcto!"));

        let reply = app.handle(Command::Quit);
        assert!(reply.quit);
        assert_eq!(app.store.get(STARS_KEY).as_deref(), Some("1"));
    }

    #[test]
    fn switching_games_settles_earnings() {
        let mut app = app();
        app.handle(Command::Quiz(AgeGroup::Toddler));
        let answer = match &app.game {
            Some(ActiveGame::Quiz(q)) => q.question().answer,
            _ => unreachable!(),
        };
        app.handle(Command::Answer(answer));
        app.handle(Command::Soup(Variant::PairSubtraction));
        assert_eq!(stars::star_balance(&*app.store), 1);

        let reply = app.handle(Command::Stars);
        assert!(reply.text.contains('1'));
    }

    #[test]
    fn unwritable_store_does_not_trap_the_player() {
        let mut app = App::new(Settings::default(), 77, Box::new(ReadOnlyStore));
        app.handle(Command::Soup(Variant::PairAddition));
        credit_one_pair(&mut app);

        let reply = app.handle(Command::Restart);
        assert!(reply.text.contains("No se pudieron guardar"));
        assert!(!reply.quit);

        let reply = app.handle(Command::Quiz(AgeGroup::Early));
        assert!(matches!(app.game, Some(ActiveGame::Quiz(_))));
        assert!(!reply.quit);

        app.handle(Command::Soup(Variant::PairAddition));
        credit_one_pair(&mut app);
        let reply = app.handle(Command::Quit);
        assert!(reply.quit);
        assert!(reply.text.contains("disk full"));
    }

    #[test]
    fn renders_selection_markers() {
        let mut app = app();
        app.handle(Command::Soup(Variant::PairAddition));
        let reply = app.handle(Command::Toggle(CellRef::new(0, 0)));
        assert!(reply.text.contains('['));
        assert!(reply.text.contains("Seleccionados"));
    }
}
