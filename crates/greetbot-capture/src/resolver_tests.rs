use super::*;
use crate::fake::{FakeElement, FakeFrame, FakeHost};
use greetbot_protocols::Rect;

const TOP_URL: &str = "https://www.zhipin.com/web/chat/recommend";
const LIST_URL: &str = "https://www.zhipin.com/web/frame/recommend/";
const RESUME_URL: &str = "https://www.zhipin.com/web/frame/c-resume/?id=1";

fn resolver(frames: Vec<Arc<FakeFrame>>) -> (Arc<FakeHost>, PageResolver) {
    let host = Arc::new(FakeHost::new(frames));
    let resolver = PageResolver::new(host.clone(), SelectorConfig::default(), CaptureConfig::default());
    (host, resolver)
}

#[tokio::test]
async fn test_host_frame_wins_over_nested_frame() {
    let s = SelectorConfig::default();
    let top = Arc::new(FakeFrame::top(TOP_URL));

    let list = Arc::new(FakeFrame::new(LIST_URL));
    let dialog = list.add(None, &s.detail_dialog, FakeElement::new(Rect::new(168.0, 50.0, 900.0, 700.0)));
    list.add(None, &s.sidebar[0], FakeElement::new(Rect::new(168.0, 50.0, 220.0, 700.0)));
    let iframe = list.add(Some(&dialog), &s.resume_iframe, FakeElement::new(Rect::new(388.0, 100.0, 680.0, 650.0)));
    list.attach_cross_origin_child(&iframe);

    let nested = Arc::new(FakeFrame::new(RESUME_URL));
    nested.add(None, "canvas", FakeElement::new(Rect::new(0.0, 0.0, 600.0, 1200.0)));

    let (_, resolver) = resolver(vec![top, nested, list]);
    let result = resolver.resolve_region().await.unwrap();

    assert!(result.success);
    assert_eq!(result.frame_url, LIST_URL);
    assert_eq!(result.rect, Some(Rect::new(388.0, 100.0, 680.0, 650.0)));
}

#[tokio::test]
async fn test_nested_frame_used_when_host_fails() {
    let nested = Arc::new(FakeFrame::new(RESUME_URL));
    nested.add(None, "canvas", FakeElement::new(Rect::new(0.0, 0.0, 600.0, 1200.0)));

    let (_, resolver) = resolver(vec![Arc::new(FakeFrame::top(TOP_URL)), nested]);
    let result = resolver.resolve_region().await.unwrap();
    assert_eq!(result.frame_url, RESUME_URL);
    assert_eq!(result.viewport.map(|v| v.width), Some(945.0));
}

#[tokio::test]
async fn test_no_frame_matched() {
    let (_, resolver) = resolver(vec![
        Arc::new(FakeFrame::top(TOP_URL)),
        Arc::new(FakeFrame::new(LIST_URL)),
    ]);
    let result = resolver.resolve_region().await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some(crate::arbiter::NO_FRAME_MATCHED));
}

#[tokio::test]
async fn test_candidate_ops_use_frame_with_most_cards() {
    let s = SelectorConfig::default();
    let top = Arc::new(FakeFrame::top(TOP_URL));
    top.add(None, &s.card_list[2], FakeElement::default());

    let list = Arc::new(FakeFrame::new(LIST_URL));
    let mut targets = Vec::new();
    for name in ["甲", "乙", "丙"] {
        let card = list.add(None, &s.card_list[0], FakeElement::default());
        list.add(Some(&card), &s.card_name, FakeElement::default().text(name));
        targets.push(list.add(Some(&card), &s.card_click_target, FakeElement::default()));
    }

    let (_, resolver) = resolver(vec![top.clone(), list.clone()]);
    assert_eq!(resolver.candidate_count().await.unwrap(), 3);
    assert_eq!(resolver.candidate_info(2).await.unwrap().name, "丙");

    resolver.click_card(1).await.unwrap();
    assert_eq!(list.clicks(), vec![targets[1].clone()]);
    assert!(top.clicks().is_empty());
}

#[tokio::test]
async fn test_no_candidates_anywhere() {
    let (_, resolver) = resolver(vec![Arc::new(FakeFrame::top(TOP_URL))]);
    assert_eq!(resolver.candidate_count().await.unwrap(), 0);
    assert!(matches!(
        resolver.candidate_info(0).await,
        Err(CaptureError::NotFoundInFrame(_))
    ));
}

#[tokio::test]
async fn test_greet_and_close_find_the_dialog_frame() {
    let s = SelectorConfig::default();
    let top = Arc::new(FakeFrame::top(TOP_URL));
    let list = Arc::new(FakeFrame::new(LIST_URL));
    list.add(None, &s.detail_dialog, FakeElement::default());
    let greet = list.add(None, &s.greet_button[0], FakeElement::default().text("打招呼"));

    let (_, resolver) = resolver(vec![top.clone(), list.clone()]);
    assert_eq!(resolver.click_greet().await.unwrap(), GreetOutcome::Clicked);
    assert_eq!(list.clicks(), vec![greet]);

    assert!(resolver.close_detail().await.unwrap());
    assert_eq!(list.escapes(), 1);
    assert_eq!(top.escapes(), 0);
}

#[tokio::test]
async fn test_greet_without_button() {
    let (_, resolver) = resolver(vec![Arc::new(FakeFrame::top(TOP_URL))]);
    assert_eq!(
        resolver.click_greet().await.unwrap(),
        GreetOutcome::Unavailable(ButtonState::NotFound)
    );
    assert!(!resolver.close_detail().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_detail() {
    let s = SelectorConfig::default();
    let list = Arc::new(FakeFrame::new(LIST_URL));
    list.add(None, &s.detail_dialog, FakeElement::default());

    let (_, resolver) = resolver(vec![Arc::new(FakeFrame::top(TOP_URL)), list]);
    resolver.wait_for_detail().await.unwrap();

    let (_, empty) = self::resolver(vec![Arc::new(FakeFrame::top(TOP_URL))]);
    assert!(matches!(
        empty.wait_for_detail().await,
        Err(CaptureError::NotFoundInTime { .. })
    ));
}

#[tokio::test]
async fn test_captcha_in_any_frame() {
    let list = Arc::new(FakeFrame::new(LIST_URL));
    list.set_body_text("请完成验证后继续");

    let (_, resolver) = resolver(vec![Arc::new(FakeFrame::top(TOP_URL)), list]);
    assert!(resolver.captcha_present().await.unwrap());
}
