//! Embedded fallback catalog
//!
//! Compiled into the binary and used when no catalog file is configured.

/// Default challenges and quests
pub const DEFAULT_CATALOG: &str = r#"
challenges:
  - id: seoul-street-food
    title: Seoul Street Food Crawl
    category: food
    difficulty: easy
    steps:
      - id: gwangjang-tteokbokki
        title: Tteokbokki at Gwangjang Market
        completed: true
      - id: myeongdong-food
        title: Myeongdong food street
        completed: true
      - id: hongdae-eggbread
        title: Egg bread in Hongdae
        completed: true
      - id: namdaemun-kimbap
        title: Kimbap at Namdaemun Market
      - id: dongdaemun-hotteok
        title: Hotteok near Dongdaemun

  - id: seoul-bakery-pilgrimage
    title: Seoul Bakery Pilgrimage
    category: food
    difficulty: medium
    steps:
      - id: seongsu-croissant
        title: Croissant in Seongsu
      - id: yeonnam-salt-bread
        title: Salt bread in Yeonnam
      - id: ikseon-cream-bun
        title: Cream bun in Ikseon-dong
      - id: hannam-sourdough
        title: Sourdough in Hannam
      - id: mangwon-donut
        title: Donut at Mangwon Market
      - id: seochon-scone
        title: Scone in Seochon

  - id: seoul-hanok-stays
    title: Hanok Village Walks
    category: culture
    difficulty: medium
    steps:
      - id: bukchon
        title: Bukchon Hanok Village
      - id: namsangol
        title: Namsangol Hanok Village
      - id: eunpyeong
        title: Eunpyeong Hanok Village

  - id: han-river-sunsets
    title: Han River Sunsets
    category: nature
    difficulty: easy
    total-steps: 10

quests:
  - city: seoul
    id: palace-trail
    title: Five Grand Palaces
    tasks:
      - id: gyeongbokgung
        title: Gyeongbokgung
      - id: changdeokgung
        title: Changdeokgung
      - id: changgyeonggung
        title: Changgyeonggung
      - id: deoksugung
        title: Deoksugung
      - id: secret-garden
        title: Huwon secret garden tour
        locked: true

  - city: busan
    id: harbor-run
    title: Busan Harbor Run
    tasks:
      - id: jagalchi
        title: Jagalchi Fish Market
      - id: gamcheon
        title: Gamcheon Culture Village
      - id: haeundae
        title: Haeundae Beach at dawn
        locked: true
"#;
