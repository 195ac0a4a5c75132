//! UI state for the diagnose screen, independent of any toolkit.
//!
//! The GUI forwards user actions here, calls [`Presenter::poll`] once per
//! frame and renders whatever state results.

use crate::alternatives::LowConfidencePolicy;
use crate::diagnosis::{Diagnosis, DiagnosisService};
use crate::error::Error;
use crate::job::Job;
use crate::knowledge::KnowledgeBase;
use crate::upload::UploadedImage;
use std::sync::Arc;

pub const ALERT_NO_IMAGE: &str = "Please upload an image first.";
pub const ALERT_KB_NOT_LOADED: &str = "Knowledge base is not loaded yet. Please wait or refresh.";
pub const KB_LOAD_FAILED: &str =
    "Error: Could not load plant disease knowledge base. Please try again later.";
pub const PROCESSING: &str = "Processing...";

pub enum KnowledgeState {
    Loading(Job<KnowledgeBase>),
    Ready(Arc<KnowledgeBase>),
    /// Terminal; loading is never retried.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Hidden,
    Processing,
    Ready(Diagnosis),
}

pub struct Presenter {
    service: DiagnosisService,
    knowledge: KnowledgeState,
    image: Option<UploadedImage>,
    results: ResultsView,
    pending: Option<Job<Diagnosis>>,
    alert: Option<String>,
}

impl Presenter {
    pub fn new(service: DiagnosisService, knowledge: Job<KnowledgeBase>) -> Self {
        Self {
            service,
            knowledge: KnowledgeState::Loading(knowledge),
            image: None,
            results: ResultsView::Hidden,
            pending: None,
            alert: None,
        }
    }

    pub fn service(&self) -> &DiagnosisService {
        &self.service
    }

    pub fn knowledge(&self) -> &KnowledgeState {
        &self.knowledge
    }

    pub fn knowledge_base(&self) -> Option<&Arc<KnowledgeBase>> {
        match &self.knowledge {
            KnowledgeState::Ready(kb) => Some(kb),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn results(&self) -> &ResultsView {
        &self.results
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// True while something will change without user input.
    pub fn needs_polling(&self) -> bool {
        self.is_busy() || matches!(self.knowledge, KnowledgeState::Loading(_))
    }

    /// Replace the selected image. Results are hidden and any diagnosis in
    /// flight is abandoned.
    pub fn select_image(&mut self, image: Option<UploadedImage>) {
        if self.pending.take().is_some() {
            tracing::debug!("Discarding pending diagnosis after new image selection");
        }
        self.results = ResultsView::Hidden;
        self.image = image;
    }

    /// Start a diagnosis. Missing preconditions raise an alert and leave the
    /// results untouched; a request while one is running is ignored.
    pub fn request_diagnosis(&mut self) {
        let Some(image) = self.image.clone() else {
            self.alert = Some(ALERT_NO_IMAGE.to_string());
            return;
        };
        let KnowledgeState::Ready(kb) = &self.knowledge else {
            self.alert = Some(ALERT_KB_NOT_LOADED.to_string());
            return;
        };
        if self.pending.is_some() {
            tracing::debug!("Diagnosis already running; request ignored");
            return;
        }
        tracing::info!("Diagnosing {} with {}", image.name, self.service.classifier().name());
        self.pending = Some(self.service.spawn(image, Arc::clone(kb)));
        self.results = ResultsView::Processing;
    }

    /// Advance background work. Cheap; call every frame.
    pub fn poll(&mut self) {
        if let KnowledgeState::Loading(job) = &self.knowledge
            && let Some(result) = job.poll()
        {
            self.knowledge = match result {
                Ok(kb) => KnowledgeState::Ready(Arc::new(kb)),
                Err(e) => KnowledgeState::Failed(e.to_string()),
            };
        }

        if let Some(job) = &self.pending
            && let Some(result) = job.poll()
        {
            self.pending = None;
            match result {
                Ok(diagnosis) => self.results = ResultsView::Ready(diagnosis),
                Err(e) => self.fail_diagnosis(e),
            }
        }
    }

    fn fail_diagnosis(&mut self, e: Error) {
        tracing::error!("Diagnosis failed: {e}");
        self.results = ResultsView::Hidden;
        self.alert = Some(format!("Diagnosis failed: {e}"));
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn set_policy(&mut self, policy: LowConfidencePolicy) {
        self.service.set_policy(policy);
    }

    pub fn diagnose_enabled(&self) -> bool {
        matches!(self.knowledge, KnowledgeState::Ready(_)) && self.pending.is_none()
    }

    pub fn diagnose_label(&self) -> &'static str {
        match self.knowledge {
            KnowledgeState::Loading(_) => "Loading...",
            KnowledgeState::Failed(_) => "Error Loading - Try Refresh",
            KnowledgeState::Ready(_) if self.service.classifier().is_simulated() => {
                "Diagnose Plant (Simulated AI)"
            }
            KnowledgeState::Ready(_) => "Diagnose Plant",
        }
    }

    /// Message for the results region when the knowledge base failed.
    pub fn load_error(&self) -> Option<&'static str> {
        match self.knowledge {
            KnowledgeState::Failed(_) => Some(KB_LOAD_FAILED),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, Prediction, SimulatedClassifier};
    use crate::error::Result;
    use crate::labels::LabelSet;
    use std::sync::{Mutex, mpsc};
    use std::time::Duration;

    const KB: &str = r#"{"Apple___healthy": {"advice": "Nothing to do.", "medicine": "None"}}"#;

    fn ready_kb() -> Job<KnowledgeBase> {
        Job::ready(KnowledgeBase::from_json_str(KB))
    }

    fn simulated() -> DiagnosisService {
        let clf = SimulatedClassifier::with_seed(LabelSet::plant_village(), Duration::ZERO, 5);
        DiagnosisService::with_seed(Arc::new(clf), LowConfidencePolicy::default(), 5)
    }

    fn image() -> UploadedImage {
        UploadedImage::new("leaf.jpg", vec![9u8; 8])
    }

    fn poll_until_idle(p: &mut Presenter) {
        for _ in 0..400 {
            p.poll();
            if !p.needs_polling() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("presenter never settled");
    }

    /// Blocks each prediction until the test releases it.
    struct GatedClassifier {
        labels: LabelSet,
        gate: Mutex<mpsc::Receiver<f32>>,
    }

    impl Classifier for GatedClassifier {
        fn name(&self) -> &str {
            "gated"
        }

        fn labels(&self) -> &LabelSet {
            &self.labels
        }

        fn predict(&self, _image: &UploadedImage) -> Result<Prediction> {
            let confidence = self
                .gate
                .lock()
                .map_err(|_| Error::WorkerDisconnected)?
                .recv()
                .map_err(|_| Error::WorkerDisconnected)?;
            Ok(Prediction {
                index: 3,
                label: self.labels.get(3).cloned().unwrap(),
                confidence,
            })
        }
    }

    fn gated() -> (DiagnosisService, mpsc::Sender<f32>) {
        let (tx, rx) = mpsc::channel();
        let clf = GatedClassifier {
            labels: LabelSet::plant_village(),
            gate: Mutex::new(rx),
        };
        let svc = DiagnosisService::with_seed(Arc::new(clf), LowConfidencePolicy::default(), 1);
        (svc, tx)
    }

    #[test]
    fn button_reflects_knowledge_state() {
        let (_tx, rx) = mpsc::channel::<()>();
        let loading = Job::spawn("slow-kb", move || {
            let _ = rx.recv();
            KnowledgeBase::from_json_str(KB)
        });
        let p = Presenter::new(simulated(), loading);
        assert!(!p.diagnose_enabled());
        assert_eq!(p.diagnose_label(), "Loading...");

        let mut p2 = Presenter::new(simulated(), ready_kb());
        p2.poll();
        assert!(p2.diagnose_enabled());
        assert_eq!(p2.diagnose_label(), "Diagnose Plant (Simulated AI)");
    }

    #[test]
    fn failed_load_disables_diagnose_for_good() {
        let mut p = Presenter::new(simulated(), Job::ready(KnowledgeBase::from_json_str("{}")));
        p.poll();
        assert!(matches!(p.knowledge(), KnowledgeState::Failed(_)));
        assert!(!p.diagnose_enabled());
        assert_eq!(p.diagnose_label(), "Error Loading - Try Refresh");
        assert_eq!(p.load_error(), Some(KB_LOAD_FAILED));

        p.select_image(Some(image()));
        p.request_diagnosis();
        assert_eq!(p.alert(), Some(ALERT_KB_NOT_LOADED));
        assert_eq!(p.results(), &ResultsView::Hidden);
    }

    #[test]
    fn diagnose_without_image_alerts_and_keeps_results() {
        let mut p = Presenter::new(simulated(), ready_kb());
        p.poll();
        p.request_diagnosis();
        assert_eq!(p.alert(), Some(ALERT_NO_IMAGE));
        assert_eq!(p.results(), &ResultsView::Hidden);
        assert!(!p.is_busy());
        p.dismiss_alert();
        assert!(p.alert().is_none());
    }

    #[test]
    fn image_check_comes_before_knowledge_check() {
        let (_tx, rx) = mpsc::channel::<()>();
        let loading = Job::spawn("slow-kb", move || {
            let _ = rx.recv();
            KnowledgeBase::from_json_str(KB)
        });
        let mut p = Presenter::new(simulated(), loading);
        p.request_diagnosis();
        assert_eq!(p.alert(), Some(ALERT_NO_IMAGE));
    }

    #[test]
    fn diagnosis_shows_processing_then_result() {
        let (svc, tx) = gated();
        let mut p = Presenter::new(svc, ready_kb());
        p.poll();
        p.select_image(Some(image()));
        p.request_diagnosis();
        assert_eq!(p.results(), &ResultsView::Processing);
        assert!(!p.diagnose_enabled());

        tx.send(0.9).unwrap();
        poll_until_idle(&mut p);
        let ResultsView::Ready(d) = p.results() else {
            panic!("expected a diagnosis, got {:?}", p.results());
        };
        assert_eq!(d.label.as_str(), "Apple___healthy");
        assert_eq!(d.advice, "Nothing to do.");
        assert_eq!(d.confidence_text, "90.00%");
        assert!(p.diagnose_enabled());
    }

    #[test]
    fn overlapping_requests_are_ignored() {
        let (svc, tx) = gated();
        let mut p = Presenter::new(svc, ready_kb());
        p.poll();
        p.select_image(Some(image()));
        p.request_diagnosis();
        p.request_diagnosis();
        assert!(p.alert().is_none());

        tx.send(0.7).unwrap();
        poll_until_idle(&mut p);
        let ResultsView::Ready(d) = p.results() else {
            panic!("expected a diagnosis");
        };
        assert_eq!(d.alternatives.len(), 2);
    }

    #[test]
    fn new_image_discards_pending_diagnosis() {
        let (svc, tx) = gated();
        let mut p = Presenter::new(svc, ready_kb());
        p.poll();
        p.select_image(Some(image()));
        p.request_diagnosis();
        p.select_image(Some(UploadedImage::new("other.png", vec![1u8])));
        assert!(!p.is_busy());
        assert_eq!(p.results(), &ResultsView::Hidden);

        tx.send(0.9).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        p.poll();
        assert_eq!(p.results(), &ResultsView::Hidden);
        assert_eq!(p.image().map(|i| i.name.as_str()), Some("other.png"));
    }

    #[test]
    fn classifier_failure_becomes_an_alert() {
        let (svc, tx) = gated();
        let mut p = Presenter::new(svc, ready_kb());
        p.poll();
        p.select_image(Some(image()));
        p.request_diagnosis();
        drop(tx);
        poll_until_idle(&mut p);
        assert_eq!(p.results(), &ResultsView::Hidden);
        assert!(p.alert().is_some_and(|a| a.starts_with("Diagnosis failed")));
    }
}
