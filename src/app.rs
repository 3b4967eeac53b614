use ratatui::style::{Color, Modifier, Style};
use tracing::info;

use village_nird::content::{Content, Scenario};
use village_nird::student::BIG_TECH_PENALTY;
use village_nird::{BadgeId, Session, Track};

pub enum GameState {
    TitleScreen,
    Teaser,
    Playing,
    Feedback,
    Quiz,
    Summary,
    Badges,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    StudentPath,
    ParentPath,
    VillageChallenge,
    Quiz,
    Badges,
    ResetProgress,
    Quit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 7] = [
        MenuOption::StudentPath,
        MenuOption::ParentPath,
        MenuOption::VillageChallenge,
        MenuOption::Quiz,
        MenuOption::Badges,
        MenuOption::ResetProgress,
        MenuOption::Quit,
    ];

    fn index(self) -> usize {
        MenuOption::ALL.iter().position(|o| *o == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        MenuOption::ALL[(self.index() + 1) % MenuOption::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let len = MenuOption::ALL.len();
        MenuOption::ALL[(self.index() + len - 1) % len]
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuOption::StudentPath => "STUDENT PATH",
            MenuOption::ParentPath => "PARENT PATH",
            MenuOption::VillageChallenge => "VILLAGE CHALLENGE",
            MenuOption::Quiz => "NIRD QUIZ",
            MenuOption::Badges => "BADGES",
            MenuOption::ResetProgress => "RESET PROGRESS",
            MenuOption::Quit => "QUIT",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Journey {
    Track(Track),
    Village,
}

impl Journey {
    pub fn label(self) -> &'static str {
        match self {
            Journey::Track(Track::Student) => "Student path",
            Journey::Track(Track::Parent) => "Parent path",
            Journey::Village => "Village challenge",
        }
    }
}

// where Enter takes the player after a feedback message
enum Step {
    Scenario,
    Summary,
    Question,
    QuizSummary,
}

pub struct App {
    pub content: Content,
    pub session: Session,
    pub state: GameState,
    pub menu_selection: MenuOption,
    pub journey: Journey,
    pub current: usize,
    pub cursor: usize,
    pub quiz_index: usize,
    pub quiz_correct: usize,
    pub message: String,
    pub message_style: Style,
    pub message_scroll: u16,
    next_step: Step,
}

impl App {
    pub fn new(content: Content, session: Session) -> Self {
        App {
            content,
            session,
            state: GameState::TitleScreen,
            menu_selection: MenuOption::StudentPath,
            journey: Journey::Track(Track::Student),
            current: 0,
            cursor: 0,
            quiz_index: 0,
            quiz_correct: 0,
            message: String::new(),
            message_style: Style::default().fg(Color::Yellow),
            message_scroll: 0,
            next_step: Step::Scenario,
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        match self.journey {
            Journey::Track(Track::Student) => &self.content.student.scenarios,
            Journey::Track(Track::Parent) => &self.content.parent.scenarios,
            Journey::Village => &self.content.village,
        }
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenarios().get(self.current)
    }

    pub fn select_menu(&mut self) -> bool {
        match self.menu_selection {
            MenuOption::StudentPath => self.start_journey(Journey::Track(Track::Student)),
            MenuOption::ParentPath => self.start_journey(Journey::Track(Track::Parent)),
            MenuOption::VillageChallenge => self.start_journey(Journey::Village),
            MenuOption::Quiz => self.start_quiz(),
            MenuOption::Badges => self.state = GameState::Badges,
            MenuOption::ResetProgress => {
                self.session.reset();
                self.message = "The village forgets everything. A fresh start!".to_string();
                self.message_style = Style::default().fg(Color::Magenta);
            }
            MenuOption::Quit => return false,
        }
        true
    }

    fn start_journey(&mut self, journey: Journey) {
        self.session.begin_adventure();
        self.journey = journey;
        self.current = 0;
        self.cursor = 0;
        self.message_scroll = 0;

        match journey {
            Journey::Track(track) if !self.session.progress().teaser_completed(track) => {
                self.state = GameState::Teaser;
                self.message = "Pick an answer with ↑/↓ and press ENTER.".to_string();
                self.message_style = Style::default().fg(Color::Yellow);
            }
            _ => self.load_scenario(0),
        }
    }

    fn start_quiz(&mut self) {
        self.session.begin_adventure();
        self.quiz_index = 0;
        self.quiz_correct = 0;
        self.cursor = 0;
        self.message = "Answer every question correctly to become Quiz Master.".to_string();
        self.message_style = Style::default().fg(Color::Yellow);
        self.state = if self.content.quiz.questions.is_empty() {
            GameState::TitleScreen
        } else {
            GameState::Quiz
        };
    }

    fn load_scenario(&mut self, index: usize) {
        if index >= self.scenarios().len() {
            self.show_summary();
            return;
        }
        self.current = index;
        self.cursor = 0;
        self.message_scroll = 0;
        self.state = GameState::Playing;

        let already = self
            .scenario()
            .map(|s| self.is_scenario_done(&s.meta.id))
            .unwrap_or(false);
        if already {
            self.message =
                "You already made this choice. Only your first answer counts.".to_string();
            self.message_style = Style::default().fg(Color::DarkGray);
        } else {
            self.message = "Choose wisely. The village is watching...".to_string();
            self.message_style = Style::default().fg(Color::Yellow);
        }
    }

    fn is_scenario_done(&self, scenario_id: &str) -> bool {
        match self.journey {
            Journey::Track(_) => self.session.progress().has_completed(scenario_id),
            Journey::Village => self.session.student().has_completed(scenario_id),
        }
    }

    pub fn option_count(&self) -> usize {
        match self.state {
            GameState::Teaser => match self.journey {
                Journey::Track(Track::Student) => self.content.student.teaser.choices.len(),
                Journey::Track(Track::Parent) => self.content.parent.teaser.choices.len(),
                Journey::Village => 0,
            },
            GameState::Playing => self.scenario().map(|s| s.choices.len()).unwrap_or(0),
            GameState::Quiz => self
                .content
                .quiz
                .questions
                .get(self.quiz_index)
                .map(|q| q.options.len())
                .unwrap_or(0),
            _ => 0,
        }
    }

    pub fn cursor_down(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.cursor = (self.cursor + 1) % count;
        }
    }

    pub fn cursor_up(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.cursor = (self.cursor + count - 1) % count;
        }
    }

    pub fn confirm(&mut self) {
        self.message_scroll = 0;
        match self.state {
            GameState::Teaser => self.answer_teaser(),
            GameState::Playing => self.choose(),
            GameState::Quiz => self.answer_question(),
            _ => {}
        }
    }

    fn answer_teaser(&mut self) {
        let Journey::Track(track) = self.journey else {
            return;
        };
        let teaser = match track {
            Track::Student => &self.content.student.teaser,
            Track::Parent => &self.content.parent.teaser,
        };
        let Some(choice) = teaser.choices.get(self.cursor).cloned() else {
            return;
        };

        let correct = track.is_correct_choice(&choice.id);
        self.session.complete_teaser(track, &choice.id, correct);

        self.message = format!(
            "{}{}\n\n[ Press ENTER to continue ]",
            if correct { "Well answered! " } else { "Not quite. " },
            choice.feedback.unwrap_or_default()
        );
        self.message_style = Style::default().fg(if correct { Color::Green } else { Color::Red });
        self.next_step = Step::Scenario;
        self.current = 0;
        self.state = GameState::Feedback;
    }

    fn choose(&mut self) {
        let journey = self.journey;
        let Some(scenario) = self.scenarios().get(self.current) else {
            return;
        };
        let Some(choice) = scenario.choices.get(self.cursor).cloned() else {
            return;
        };
        let scenario_id = scenario.meta.id.clone();
        let reward = scenario.reward();

        let (good, outcome, detail) = match journey {
            Journey::Track(track) => {
                let correct = track.is_correct_choice(&choice.id);
                let text = if correct {
                    &scenario.narrative.success
                } else {
                    &scenario.narrative.failure
                };
                (correct, text.clone(), format!("{:+} points", choice.points))
            }
            Journey::Village => {
                let alternative = !choice.big_tech;
                let (text, applied) = if alternative {
                    (&scenario.narrative.success, reward)
                } else {
                    (&scenario.narrative.failure, BIG_TECH_PENALTY)
                };
                (alternative, text.clone(), applied.to_string())
            }
        };

        let recorded = match journey {
            Journey::Track(track) => {
                self.session
                    .complete_scenario(track, &scenario_id, &choice.id, good, choice.points)
            }
            Journey::Village => {
                self.session
                    .complete_student_scenario(&scenario_id, &choice.id, good, reward)
            }
        };

        let feedback = choice
            .feedback
            .map(|f| format!("\n\n{f}"))
            .unwrap_or_default();
        let tally = if recorded {
            format!("  {detail}")
        } else {
            "  (already recorded, your first answer stands)".to_string()
        };
        self.message = format!(
            "{}{}  [ Press ENTER ]\n\n{}{}",
            if good { "*** RESISTANCE! ***" } else { "*** BIG TECH WINS THIS ONE ***" },
            tally,
            outcome,
            feedback
        );
        self.message_style = Style::default().fg(if good { Color::Green } else { Color::Red });

        if self.current + 1 < self.scenarios().len() {
            self.current += 1;
            self.next_step = Step::Scenario;
        } else {
            self.next_step = Step::Summary;
        }
        self.state = GameState::Feedback;
    }

    fn answer_question(&mut self) {
        let Some(question) = self.content.quiz.questions.get(self.quiz_index) else {
            return;
        };
        let correct = question.is_correct(self.cursor);
        if correct {
            self.quiz_correct += 1;
        }
        let right_answer = question
            .options
            .get(question.answer)
            .cloned()
            .unwrap_or_default();
        let explanation = question
            .explanation
            .as_ref()
            .map(|e| format!("\n\n{e}"))
            .unwrap_or_default();

        self.message = if correct {
            format!("Correct!{explanation}\n\n[ Press ENTER ]")
        } else {
            format!("Wrong. The answer was: {right_answer}{explanation}\n\n[ Press ENTER ]")
        };
        self.message_style = Style::default().fg(if correct { Color::Green } else { Color::Red });

        self.quiz_index += 1;
        self.cursor = 0;
        self.next_step = if self.quiz_index < self.content.quiz.questions.len() {
            Step::Question
        } else {
            Step::QuizSummary
        };
        self.state = GameState::Feedback;
    }

    pub fn continue_after_feedback(&mut self) {
        match self.next_step {
            Step::Scenario => self.load_scenario(self.current),
            Step::Summary => self.show_summary(),
            Step::Question => {
                self.message = "Next question...".to_string();
                self.message_style = Style::default().fg(Color::Yellow);
                self.state = GameState::Quiz;
            }
            Step::QuizSummary => self.finish_quiz(),
        }
    }

    fn finish_quiz(&mut self) {
        let total = self.content.quiz.questions.len();
        let unlocked = self.session.complete_quiz(self.quiz_correct, total);
        let perfect = self.quiz_correct == total;

        self.message = format!(
            "=== {} ===\n\n\
            You answered {} of {} questions correctly.{}\n\n\
            Press ENTER to return to the village square...",
            self.content.quiz.title,
            self.quiz_correct,
            total,
            if unlocked.contains(&BadgeId::QuizMaster) {
                "\n\nA new badge is yours: Quiz Master!"
            } else if perfect {
                "\n\nPerfect again!"
            } else {
                ""
            }
        );
        self.message_style = Style::default()
            .fg(if perfect { Color::Green } else { Color::Yellow })
            .add_modifier(Modifier::BOLD);
        self.state = GameState::Summary;
    }

    fn show_summary(&mut self) {
        let summary = match self.journey {
            Journey::Track(track) => {
                let progress = self.session.progress();
                let correct = progress.entries(track).iter().filter(|e| e.is_correct).count();
                format!(
                    "╔══════════════════════════╗\n\
                    ║  PATH STATS              ║\n\
                    ╠══════════════════════════╣\n\
                    ║  Scenarios done:   {:>4}  ║\n\
                    ║  Free choices:     {:>4}  ║\n\
                    ║  Score:            {:>4}  ║\n\
                    ╚══════════════════════════╝",
                    progress.completion_count(track),
                    correct,
                    progress.score(track),
                )
            }
            Journey::Village => {
                let points = self.session.student().points();
                format!(
                    "╔══════════════════════════╗\n\
                    ║  VILLAGE TREASURY        ║\n\
                    ╠══════════════════════════╣\n\
                    ║  Money:            {:>5} ║\n\
                    ║  Protection:       {:>5} ║\n\
                    ║  Environment:      {:>5} ║\n\
                    ╚══════════════════════════╝",
                    points.money, points.protection, points.environment,
                )
            }
        };
        info!(journey = self.journey.label(), "journey finished");

        self.message = format!(
            "=== {} COMPLETE! ===\n\n{}\n\nPress ENTER to return to the village square...",
            self.journey.label().to_uppercase(),
            summary
        );
        self.message_style = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);
        self.state = GameState::Summary;
    }

    pub fn back_to_title(&mut self) {
        self.state = GameState::TitleScreen;
        self.message.clear();
        self.message_scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use village_nird::content::load_content;

    fn shipped_app() -> App {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        App::new(load_content(&root).unwrap(), Session::in_memory())
    }

    fn open(app: &mut App, option: MenuOption) {
        app.back_to_title();
        app.menu_selection = option;
        assert!(app.select_menu());
    }

    fn pick(app: &mut App, choice_id: &str) {
        let index = app
            .scenario()
            .and_then(|s| s.choices.iter().position(|c| c.id == choice_id))
            .unwrap();
        app.cursor = index;
        app.confirm();
        assert!(matches!(app.state, GameState::Feedback));
    }

    #[test]
    fn teaser_is_asked_once_per_track() {
        let mut app = shipped_app();

        open(&mut app, MenuOption::StudentPath);
        assert!(matches!(app.state, GameState::Teaser));
        app.cursor = 0;
        app.confirm();
        assert!(matches!(app.state, GameState::Feedback));
        assert!(app.session.progress().teaser_completed(Track::Student));
        assert!(app.session.achievements().has_badge(BadgeId::Explorer));

        app.continue_after_feedback();
        assert!(matches!(app.state, GameState::Playing));

        open(&mut app, MenuOption::StudentPath);
        assert!(matches!(app.state, GameState::Playing));
        assert_eq!(app.current, 0);

        open(&mut app, MenuOption::ParentPath);
        assert!(matches!(app.state, GameState::Teaser));
    }

    #[test]
    fn track_choice_shows_signed_points() {
        let mut app = shipped_app();
        app.session.complete_teaser(Track::Student, "nird", true);
        open(&mut app, MenuOption::StudentPath);

        pick(&mut app, "nird");

        assert!(app.message.contains("+30 points"));
        assert_eq!(app.session.progress().score(Track::Student), 30);
    }

    #[test]
    fn big_tech_village_choice_costs_the_penalty() {
        let mut app = shipped_app();
        open(&mut app, MenuOption::VillageChallenge);
        assert!(matches!(app.state, GameState::Playing));

        pick(&mut app, "A");

        let student = app.session.student();
        assert_eq!(student.points(), BIG_TECH_PENALTY);
        assert!(!student.entries()[0].is_correct);
        assert!(app.message.contains(&BIG_TECH_PENALTY.to_string()));
        assert!(app.message.contains("BIG TECH WINS"));
    }

    #[test]
    fn alternative_village_choice_earns_the_reward() {
        let mut app = shipped_app();
        open(&mut app, MenuOption::VillageChallenge);
        let reward = app.scenario().unwrap().reward();

        pick(&mut app, "B");

        assert_eq!(app.session.student().points(), reward);
        assert!(app.session.student().entries()[0].is_correct);
        assert!(app.message.contains(&reward.to_string()));
    }

    #[test]
    fn replaying_a_scenario_keeps_the_first_answer() {
        let mut app = shipped_app();
        open(&mut app, MenuOption::VillageChallenge);
        pick(&mut app, "B");
        let points = app.session.student().points();

        open(&mut app, MenuOption::VillageChallenge);
        assert!(app.message.contains("already made this choice"));
        pick(&mut app, "A");

        assert!(app.message.contains("already recorded"));
        assert_eq!(app.session.student().completed_count(), 1);
        assert_eq!(app.session.student().points(), points);
    }

    #[test]
    fn perfect_quiz_earns_quiz_master() {
        let mut app = shipped_app();
        open(&mut app, MenuOption::Quiz);
        let answers: Vec<usize> = app.content.quiz.questions.iter().map(|q| q.answer).collect();

        for answer in &answers {
            assert!(matches!(app.state, GameState::Quiz));
            app.cursor = *answer;
            app.confirm();
            app.continue_after_feedback();
        }

        assert!(matches!(app.state, GameState::Summary));
        assert_eq!(app.quiz_correct, answers.len());
        assert!(app.session.achievements().has_badge(BadgeId::QuizMaster));
    }

    #[test]
    fn one_wrong_quiz_answer_withholds_the_badge() {
        let mut app = shipped_app();
        open(&mut app, MenuOption::Quiz);
        let total = app.content.quiz.questions.len();

        for i in 0..total {
            let question = &app.content.quiz.questions[i];
            app.cursor = if i == 0 {
                (question.answer + 1) % question.options.len()
            } else {
                question.answer
            };
            app.confirm();
            app.continue_after_feedback();
        }

        assert!(matches!(app.state, GameState::Summary));
        assert!(!app.session.achievements().has_badge(BadgeId::QuizMaster));
    }
}
